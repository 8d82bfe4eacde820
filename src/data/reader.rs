use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use super::model::{Dataset, Metadata, MetadataValue, Record, ScanEntry, SCAN_INFO_KEY};

/// A line whose trimmed text starts with this token is the column-header
/// line; everything after it is the data region.
const COLUMN_HEADER_SENTINEL: &str = "UNIXTime";

/// Header lines carrying one scan-info entry start with this marker.
const SCAN_INFO_PREFIX: &str = "Active:";

/// Data rows with fewer comma-separated tokens than this are dropped.
const MIN_DATA_TOKENS: usize = 11;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse one scan file into metadata plus ordered measurement records.
///
/// The file splits into a header region and a data region at the first line
/// starting with `UNIXTime` (that line itself is discarded). Header lines
/// are classified per line: `Active:` lines become ordered scan-info
/// entries, other `key: value` lines become plain metadata (last key wins),
/// anything else is ignored. Data lines are comma-split and positionally
/// mapped; rows with fewer than 11 tokens are dropped, while a non-numeric
/// token in a kept row fails the whole file.
pub fn parse_file(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (header_lines, data_text) = split_sections(&text);
    let metadata = parse_header(&header_lines);
    let records = parse_data_region(path, &data_text)?;

    info!(
        "parsed {} records and {} metadata keys from '{}'",
        records.len(),
        metadata.len(),
        path.display()
    );
    Ok(Dataset::new(metadata, records))
}

// ---------------------------------------------------------------------------
// Section split
// ---------------------------------------------------------------------------

/// Separate header lines from the data-region text. Blank lines are dropped
/// in both regions; once the sentinel has been seen, every remaining
/// non-blank line is data regardless of its content.
fn split_sections(text: &str) -> (Vec<&str>, String) {
    let mut header_lines = Vec::new();
    let mut data_text = String::new();
    let mut in_data = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !in_data && trimmed.starts_with(COLUMN_HEADER_SENTINEL) {
            in_data = true;
            continue;
        }
        if in_data {
            data_text.push_str(trimmed);
            data_text.push('\n');
        } else {
            header_lines.push(trimmed);
        }
    }

    (header_lines, data_text)
}

// ---------------------------------------------------------------------------
// Header region
// ---------------------------------------------------------------------------

/// Fold the header lines into an immutable metadata map.
fn parse_header(lines: &[&str]) -> Metadata {
    let mut metadata = Metadata::new();
    let mut scan_info: Vec<ScanEntry> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix(SCAN_INFO_PREFIX) {
            // One scan-info entry per line: comma-separated key:value
            // pairs; parts without a colon are ignored.
            let mut entry = ScanEntry::new();
            for part in rest.split(',') {
                if let Some((key, value)) = part.split_once(':') {
                    entry.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
            scan_info.push(entry);
        } else if let Some((key, value)) = line.split_once(':') {
            metadata.insert(
                key.trim().to_string(),
                MetadataValue::Text(value.trim().to_string()),
            );
        }
        // Lines matching neither rule are silently ignored.
    }

    if !scan_info.is_empty() {
        metadata.insert(SCAN_INFO_KEY.to_string(), MetadataValue::ScanInfo(scan_info));
    }
    metadata
}

// ---------------------------------------------------------------------------
// Data region
// ---------------------------------------------------------------------------

/// Walk the data region as unquoted, flexible-width CSV.
fn parse_data_region(path: &Path, text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = row_no + 1;
        let tokens = result.map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        if tokens.len() < MIN_DATA_TOKENS {
            debug!(
                "'{}' data row {row}: dropped ({} of {MIN_DATA_TOKENS} tokens)",
                path.display(),
                tokens.len()
            );
            continue;
        }

        records.push(parse_row(path, row, &tokens)?);
    }
    Ok(records)
}

/// Map one tokenized data row onto a [`Record`] by fixed column index.
fn parse_row(path: &Path, row: usize, tokens: &csv::StringRecord) -> Result<Record> {
    let float = |idx: usize, field: &'static str| -> Result<f64> {
        let tok = tokens.get(idx).unwrap_or("");
        tok.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                row,
                field,
                value: tok.to_string(),
            })
    };
    let integer = |idx: usize, field: &'static str| -> Result<i64> {
        let tok = tokens.get(idx).unwrap_or("");
        tok.parse::<i64>().map_err(|_| Error::Parse {
            path: path.to_path_buf(),
            row,
            field,
            value: tok.to_string(),
        })
    };

    Ok(Record {
        timestamp: float(0, "timestamp")?,
        revolver_position: integer(1, "revolver position")?,
        sample_position: float(2, "sample position")?,
        detector_position: float(3, "detector position")?,
        wavelength: float(4, "wavelength")?,
        signal: float(5, "signal")?,
        // Column 6 feeds both the signal deviation and the dark current,
        // and column 8 is never read. Existing capture files are written
        // against this layout, so the mapping must stay as-is.
        signal_stddev: float(6, "signal stddev")?,
        dark_current: float(6, "dark current")?,
        dark_current_stddev: float(7, "dark current stddev")?,
        temperature: float(9, "temperature")?,
        humidity: float(10, "humidity")?,
    })
}
