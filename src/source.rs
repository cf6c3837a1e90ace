//! CSV point source
//!
//! Reads observations from a CSV file with a header row. The coordinate and
//! value columns are looked up by name. Rows with a missing or unparsable
//! coordinate or value are skipped.

use crate::error::{Error, Result};
use crate::point::{Observation, PointSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Column names to read
#[derive(Debug, Clone, PartialEq)]
pub struct CsvColumns {
    pub x: String,
    pub y: String,
    pub value: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            x: "longitude".into(),
            y: "latitude".into(),
            value: "wind".into(),
        }
    }
}

impl CsvColumns {
    pub fn new(x: impl Into<String>, y: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            value: value.into(),
        }
    }
}

fn resolve_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "column '{name}' not found in CSV header ({})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}

fn parse_field(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    record.get(idx)?.trim().parse::<f64>().ok()
}

/// Read observations from any CSV stream
///
/// Values may be NaN (they are removed by the cleaner); coordinates must be
/// finite.
pub fn read_points<R: Read>(reader: R, columns: &CsvColumns) -> Result<PointSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let x_idx = resolve_column(&headers, &columns.x)?;
    let y_idx = resolve_column(&headers, &columns.y)?;
    let v_idx = resolve_column(&headers, &columns.value)?;

    let mut points = PointSet::new();
    let mut skipped = 0usize;

    for (row, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(row = row + 1, error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };

        let parsed = (
            parse_field(&record, x_idx),
            parse_field(&record, y_idx),
            parse_field(&record, v_idx),
        );
        match parsed {
            (Some(x), Some(y), Some(z)) if x.is_finite() && y.is_finite() => {
                points.push(Observation::new(x, y, z));
            }
            _ => {
                debug!(row = row + 1, "skipping row with missing or invalid fields");
                skipped += 1;
            }
        }
    }

    debug!(read = points.len(), skipped, "read CSV observations");
    Ok(points)
}

/// Read observations from a CSV file
pub fn read_csv(path: &Path, columns: &CsvColumns) -> Result<PointSet> {
    let file = File::open(path)?;
    let points = read_points(BufReader::new(file), columns)?;
    info!(path = %path.display(), points = points.len(), "loaded observations");
    Ok(points)
}
