//! Survey dataset loading.
//!
//! Reads a JSON array of row objects (`.json`) or a headed CSV file (`.csv`)
//! keyed by the questionnaire's French column names.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{HealthRecord, RawHealthRecord};

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON dataset must be an array of records")]
    NotAnArray,

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),
}

/// Load a dataset, choosing the parser from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON/CSV, or has
/// an unknown extension. Individual malformed rows are skipped, not fatal.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<HealthRecord>, DatasetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = match extension.as_str() {
        "json" => read_json(file)?,
        "csv" => read_csv(file)?,
        other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
    };

    info!(path = %path.display(), records = records.len(), "Dataset loaded");
    Ok(records)
}

/// Parse a JSON array of row objects.
///
/// # Errors
///
/// Returns an error if the input is not a JSON array.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<HealthRecord>, DatasetError> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let serde_json::Value::Array(rows) = value else {
        return Err(DatasetError::NotAnArray);
    };

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match HealthRecord::from_json(row) {
            Ok(record) => records.push(record),
            Err(e) => warn!(row = index, error = %e, "Skipping malformed dataset row"),
        }
    }
    Ok(records)
}

/// Parse a headed CSV file. Every cell is read as text and converted with
/// the same lenient rules as JSON rows.
///
/// # Errors
///
/// Returns an error if the header cannot be read.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<HealthRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    debug!(columns = headers.len(), "CSV header read");

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(row = index, error = %e, "Skipping unreadable CSV row");
                continue;
            }
        };

        let object: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(column, cell)| (column.to_string(), serde_json::Value::from(cell)))
            .collect();

        match serde_json::from_value::<RawHealthRecord>(serde_json::Value::Object(object)) {
            Ok(raw) => records.push(HealthRecord::from(raw)),
            Err(e) => warn!(row = index, error = %e, "Skipping malformed CSV row"),
        }
    }
    Ok(records)
}
