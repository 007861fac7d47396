//! Result table keyed by title and its CSV serialization.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ExtractError, Result};
use crate::record::ResultRecord;

pub const CSV_HEADER: [&str; 3] = ["word", "pos", "abbreviations"];

const WRITE_BUFFER_CAPACITY: usize = 256 * 1024;

/// Records in first-seen title order. Re-inserting a title replaces the
/// stored record in place.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<ResultRecord>,
    index: HashMap<String, usize>,
}

impl ResultTable {
    /// Drains the whole sequence before anything is written; the first error
    /// aborts and drops what was collected.
    pub fn record<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<ResultRecord>>,
    {
        let mut table = ResultTable::default();
        for record in records {
            table.insert(record?);
        }
        Ok(table)
    }

    /// Returns the record previously stored under the same title.
    pub fn insert(&mut self, record: ResultRecord) -> Option<ResultRecord> {
        match self.index.get(&record.title) {
            Some(&i) => {
                log::debug!("duplicate title {:?} replaces earlier entry", record.title);
                Some(std::mem::replace(&mut self.rows[i], record))
            }
            None => {
                self.index.insert(record.title.clone(), self.rows.len());
                self.rows.push(record);
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&ResultRecord> {
        self.index.get(title).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.rows.iter()
    }

    pub fn write_csv<W: Write>(&self, mut wtr: W) -> std::io::Result<()> {
        write_row(&mut wtr, &CSV_HEADER)?;
        for record in &self.rows {
            let pos = record.pos.to_string();
            let abbreviations = record.abbreviations.to_string();
            write_row(&mut wtr, &[record.title.as_str(), &pos, &abbreviations])?;
        }
        Ok(())
    }

    /// Creates (or truncates) `path` and writes the table. Returns the row count.
    pub fn save(&self, path: &Path) -> Result<usize> {
        let file = File::create(path).map_err(|source| ExtractError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, file);
        self.write_csv(&mut writer)?;
        writer.flush()?;
        Ok(self.rows.len())
    }
}

/// Writes one record with a single csv-core writer, so fields are quoted only
/// when they hold a delimiter, quote or line break, and rows end in CRLF.
fn write_row<W: Write>(wtr: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let mut output = [0; 4096];
    let mut writer = csv_core::WriterBuilder::new()
        .terminator(csv_core::Terminator::CRLF)
        .build();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            let (result, nout) = writer.delimiter(&mut output);
            debug_assert_eq!(result, csv_core::WriteResult::InputEmpty);
            wtr.write_all(&output[..nout])?;
        }
        let mut data = field.as_bytes();
        loop {
            let (result, nin, nout) = writer.field(data, &mut output);
            wtr.write_all(&output[..nout])?;
            if result == csv_core::WriteResult::InputEmpty {
                break;
            }
            data = &data[nin..];
        }
    }
    let (result, nout) = writer.terminator(&mut output);
    debug_assert_eq!(result, csv_core::WriteResult::InputEmpty);
    wtr.write_all(&output[..nout])
}
