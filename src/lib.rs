//! Streaming extraction of part-of-speech tags and abbreviation expansions
//! from Wiktionary XML dumps.
//!
//! The pipeline reads `<page>` elements one at a time ([`PageWalker`]),
//! keeps pages with an English section, runs [`pos::classify`] and
//! [`abbrev::extract`] over their wikitext, and collects one
//! [`ResultRecord`] per title into a [`ResultTable`] that is written out as
//! CSV once the whole dump has been read.

pub mod abbrev;
pub mod error;
pub mod pos;
pub mod record;
pub mod sink;
pub mod walker;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::BzDecoder;

pub use crate::abbrev::AbbreviationSet;
pub use crate::error::{ExtractError, Result};
pub use crate::pos::{PosSet, PosTag};
pub use crate::record::ResultRecord;
pub use crate::sink::ResultTable;
pub use crate::walker::{PageWalker, WalkStats, ENGLISH_MARKER};

const READ_BUFFER_CAPACITY: usize = 256 * 1024;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: WalkStats,
    /// Rows written; fewer than `stats.records` when titles repeat.
    pub rows: usize,
}

/// Opens a dump for reading, decompressing `.bz2` files on the fly.
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file))
    };
    Ok(reader)
}

/// Reads `input` and writes the CSV table to `output`.
///
/// `output` is only created after the whole dump has been read successfully.
pub fn process_dump(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<RunSummary> {
    process_dump_with_progress(input, output, |_| {})
}

/// Like [`process_dump`], calling `progress` each time the walker hands over a record.
pub fn process_dump_with_progress<F>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mut progress: F,
) -> Result<RunSummary>
where
    F: FnMut(&WalkStats),
{
    let (input, output) = (input.as_ref(), output.as_ref());
    let reader = open_dump(input)?;
    log::info!("reading {}", input.display());

    let mut walker = PageWalker::new(reader);
    let table = {
        let records = std::iter::from_fn(|| {
            let next = walker.next();
            progress(walker.stats());
            next
        });
        ResultTable::record(records)?
    };
    let stats = walker.into_stats();

    log::info!("writing {} rows to {}", table.len(), output.display());
    let rows = table.save(output)?;
    Ok(RunSummary { stats, rows })
}
