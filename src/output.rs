use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::classify::upcoming;
use crate::record::{CanonicalEventRecord, RawEventRecord};

pub const CSV_OUTPUT_FILE: &str = "hackathons_final.csv";
pub const RAW_CSV_OUTPUT_FILE: &str = "hackathons.csv";

pub const CANONICAL_COLUMNS: [&str; 11] = [
    "title", "date_text", "location_text", "link", "source", "scraped_at",
    "date", "year", "month_name", "days_left", "mode",
];
pub const RAW_COLUMNS: [&str; 6] = [
    "title", "date_text", "location_text", "link", "source", "scraped_at",
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

// ============================================================================
// CSV OUTPUT
// ============================================================================

/// Writes the canonical set to `path`, replacing whatever was there
pub fn save(records: &[CanonicalEventRecord], path: &Path) -> Result<(), StoreError> {
    write_snapshot(records, &CANONICAL_COLUMNS, path)?;
    info!(count = records.len(), path = %path.display(), "canonical records written");
    Ok(())
}

/// Writes the deduplicated, unclassified records to `path`
pub fn save_raw(records: &[RawEventRecord], path: &Path) -> Result<(), StoreError> {
    write_snapshot(records, &RAW_COLUMNS, path)?;
    info!(count = records.len(), path = %path.display(), "raw records written");
    Ok(())
}

/// Header is written explicitly so an empty run still yields a valid file.
/// Rows go to a sibling temp file first; the rename swaps in the whole snapshot at once.
fn write_snapshot<T: Serialize>(rows: &[T], header: &[&str], path: &Path) -> Result<(), StoreError> {
    let tmp_path = temp_path(path);
    let write_err = |source: std::io::Error| StoreError::Write { path: path.to_path_buf(), source };

    let file = File::create(&tmp_path).map_err(write_err)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    let written = write_rows(&mut writer, header, rows);
    drop(writer);

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path).map_err(write_err)
}

fn write_rows<W: Write, T: Serialize>(
    writer: &mut csv::Writer<W>,
    header: &[&str],
    rows: &[T],
) -> Result<(), StoreError> {
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// ============================================================================
// CSV INPUT
// ============================================================================

/// Reads a canonical file back. Rows that do not fit the schema are skipped.
pub fn load(path: &Path) -> Result<Vec<CanonicalEventRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, row) in reader.deserialize::<CanonicalEventRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                if let csv::ErrorKind::Io(_) = e.kind() {
                    return Err(StoreError::Read { path: path.to_path_buf(), source: e });
                }
                warn!(row = idx + 1, error = %e, "skipping malformed row");
                skipped += 1;
            }
        }
    }

    info!(count = records.len(), skipped, path = %path.display(), "canonical records loaded");
    Ok(records)
}

// ============================================================================
// OUTPUT FORMATTING
// ============================================================================

/// Prints counts per source and per mode
pub fn print_summary(records: &[CanonicalEventRecord]) {
    let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_mode: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *by_source.entry(record.source.to_string()).or_default() += 1;
        *by_mode.entry(record.mode.to_string()).or_default() += 1;
    }

    println!("\nTotal upcoming hackathons: {}", records.len());
    println!("{:-<80}", "");
    println!("By source:");
    for (source, count) in &by_source {
        println!("  {:15} {}", source, count);
    }
    println!("By mode:");
    for (mode, count) in &by_mode {
        println!("  {:15} {}", mode, count);
    }
}

/// Prints the `n` soonest events
pub fn print_upcoming(records: &[CanonicalEventRecord], n: usize) {
    println!("\nTop {} upcoming hackathons:", n);
    println!("{:-<80}", "");

    for record in upcoming(records, n) {
        println!(
            "{} ({:>3}d) {:40} {:8} {:14} {}",
            record.date,
            record.days_left,
            record.title,
            record.mode,
            record.source,
            record.link
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("out/hackathons_final.csv")),
            PathBuf::from("out/hackathons_final.csv.tmp")
        );
    }
}
