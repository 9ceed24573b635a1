//! Pipe-delimited stratagem export reader

use crate::error::{open_error, Result};
use crate::models::StratagemRow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const BOM: char = '\u{feff}';

/// CSV parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub total_rows: u32,
    pub imported: u32,
    /// Rows whose `name` is empty or blank
    pub skipped_blank: u32,
    /// Records the CSV parser rejected
    pub malformed: u32,
}

/// Reads every usable row of a stratagem export.
///
/// Blank-name rows and malformed records are counted, logged and skipped.
pub fn read_stratagems(path: &Path) -> Result<(Vec<StratagemRow>, ImportStats)> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let (rows, stats) = read_stratagems_from(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        imported = stats.imported,
        skipped = stats.skipped_blank,
        malformed = stats.malformed,
        "read stratagem export"
    );
    Ok((rows, stats))
}

pub fn read_stratagems_from<R: Read>(reader: R) -> Result<(Vec<StratagemRow>, ImportStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim())
        .collect();
    reader.set_headers(headers.clone());

    let mut rows = Vec::new();
    let mut stats = ImportStats::default();

    for (index, record) in reader.records().enumerate() {
        stats.total_rows += 1;
        // header is line 1
        let line = index + 2;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(line, error = %e, "skipping malformed record");
                continue;
            }
        };

        let row: StratagemRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(line, error = %e, "skipping undecodable record");
                continue;
            }
        };

        if row.name.trim().is_empty() {
            stats.skipped_blank += 1;
            continue;
        }

        stats.imported += 1;
        rows.push(row);
    }

    Ok((rows, stats))
}
