use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::classify::ClassifyError;
use crate::core::types::VariantKey;

/// Zero-based column holding the sample tag (alignment file name)
pub const SAMPLE_COLUMN: usize = 4;

/// Zero-based column holding the allele frequency
pub const VALUE_COLUMN: usize = 13;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed counts table, line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Counts table line {line}: cannot assign a sample role: {source}")]
    Unclassified {
        line: usize,
        #[source]
        source: ClassifyError,
    },
}

/// One measurement from the unified read-count table
#[derive(Debug, Clone, PartialEq)]
pub struct CountsRow {
    pub key: VariantKey,
    /// Sample tag used to classify the row
    pub sample: String,
    /// Allele frequency
    pub value: f64,
    /// 1-based line number in the source table
    pub line: usize,
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a counts table, transparently decompressing `.gz` files
///
/// # Errors
///
/// Returns `TrackError::Io` if the file cannot be opened.
pub fn open_counts(path: &Path) -> Result<Box<dyn BufRead>, TrackError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every data row of a counts table
///
/// # Errors
///
/// Returns `TrackError::Io` on read failure or `TrackError::Malformed` for
/// the first row that cannot be parsed.
pub fn read_counts_file(path: &Path) -> Result<Vec<CountsRow>, TrackError> {
    read_counts(open_counts(path)?)
}

/// Read every data row from a reader; the first line is a header
///
/// # Errors
///
/// See [`read_counts_file`].
pub fn read_counts<R: BufRead>(reader: R) -> Result<Vec<CountsRow>, TrackError> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_counts_line(line, i + 1)?);
    }
    Ok(rows)
}

/// Parse one tab-separated data line
///
/// # Errors
///
/// Returns `TrackError::Malformed` if the line has too few columns or a
/// non-numeric position or allele frequency.
pub fn parse_counts_line(line: &str, line_num: usize) -> Result<CountsRow, TrackError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() <= VALUE_COLUMN {
        return Err(TrackError::Malformed {
            line: line_num,
            reason: format!(
                "expected at least {} columns, found {}",
                VALUE_COLUMN + 1,
                fields.len()
            ),
        });
    }

    let pos: u64 = fields[1].trim().parse().map_err(|_| TrackError::Malformed {
        line: line_num,
        reason: format!("invalid position '{}'", fields[1]),
    })?;
    let value: f64 = fields[VALUE_COLUMN]
        .trim()
        .parse()
        .map_err(|_| TrackError::Malformed {
            line: line_num,
            reason: format!("invalid allele frequency '{}'", fields[VALUE_COLUMN]),
        })?;

    Ok(CountsRow {
        key: VariantKey::new(fields[0].trim(), pos, fields[2].trim(), fields[3].trim()),
        sample: fields[SAMPLE_COLUMN].to_string(),
        value,
        line: line_num,
    })
}
