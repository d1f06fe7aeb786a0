use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::core::types::EventType;

/// Name of the cumulative summary written to the output directory
pub const SUMMARY_FILE_NAME: &str = "summary_result.txt";

/// One event table that was present after SNV computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTable {
    pub event: EventType,
    pub path: PathBuf,
    /// Data records, excluding the header line
    pub records: usize,
}

/// Find the event tables written into `dir`, in summary order
///
/// Event types with no file are skipped; not every type fires for every
/// sample set.
///
/// # Errors
///
/// Returns an IO error if a present file cannot be read.
pub fn collect_event_tables(dir: &Path) -> io::Result<Vec<EventTable>> {
    let mut tables = Vec::new();
    for event in EventType::ALL {
        let path = dir.join(event.file_name());
        if !path.is_file() {
            continue;
        }
        let records = count_records(&path)?;
        debug!("{event}: {records} records in {}", path.display());
        tables.push(EventTable {
            event,
            path,
            records,
        });
    }
    Ok(tables)
}

fn count_records(path: &Path) -> io::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines().skip(1) {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Append every event table's records into one summary file
///
/// The header is `Event` followed by the first table's header; each record
/// is prefixed with its event type. An existing file at `dest` is replaced.
///
/// # Errors
///
/// Returns an IO error if a table cannot be read or the summary written.
pub fn write_summary(tables: &[EventTable], dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_file(dest)?;
    }

    let mut writer = BufWriter::new(File::create(dest)?);
    let mut wrote_header = false;

    for table in tables {
        let reader = BufReader::new(File::open(&table.path)?);
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.unwrap_or_default();
        if !wrote_header {
            if header.is_empty() {
                writeln!(writer, "Event")?;
            } else {
                writeln!(writer, "Event\t{header}")?;
            }
            wrote_header = true;
        }

        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            writeln!(writer, "{}\t{line}", table.event.code())?;
        }
    }

    if !wrote_header {
        writeln!(writer, "Event")?;
    }
    writer.flush()
}
