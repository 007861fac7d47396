use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use wiktionary_pos_abbrev::process_dump_with_progress;

const PROGRESS_EVERY: usize = 1000;

#[derive(Parser)]
#[command(name = "wiktionary-pos-abbrev")]
#[command(about = "Extract POS tags and abbreviations from a Wiktionary XML dump - one CSV row per English entry")]
struct Args {
    /// Input XML file (.xml or .xml.bz2)
    input: PathBuf,

    /// Output CSV file
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Parsing: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!();

    let start_time = Instant::now();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);

    let mut last_reported = 0;
    let result = process_dump_with_progress(&args.input, &args.output, |stats| {
        if stats.pages / PROGRESS_EVERY > last_reported {
            last_reported = stats.pages / PROGRESS_EVERY;
            let rate = stats.pages as f64 / start_time.elapsed().as_secs_f64();
            pb.set_message(format!(
                "Pages: {} | English: {} | Rate: {:.0} pg/s",
                stats.pages, stats.records, rate
            ));
        }
    });
    pb.finish_and_clear();

    let summary = result.with_context(|| {
        format!(
            "failed to process {} into {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    let stats = summary.stats;
    let elapsed = start_time.elapsed();
    println!("============================================================");
    println!("Pages processed: {}", stats.pages);
    println!("English entries: {}", stats.records);
    println!("Rows written: {}", summary.rows);
    println!("Non-English pages: {}", stats.non_english);
    println!("Incomplete pages: {}", stats.incomplete);
    println!("Time: {}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60);
    println!(
        "Rate: {:.0} pages/sec",
        stats.pages as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("============================================================");

    Ok(())
}
