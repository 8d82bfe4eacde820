//! Error types for the reflscan library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ingestion and analysis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reading or accessing a scan file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data row had enough columns but a required numeric field did not
    /// parse. Fatal for the whole file: a bad token is never degraded to a
    /// dropped row.
    #[error("parse error in '{path}', data row {row}: '{value}' is not a valid {field}")]
    Parse {
        path: PathBuf,
        /// 1-based row index within the data region.
        row: usize,
        field: &'static str,
        value: String,
    },

    /// Error from the CSV reader while walking the data region.
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Empty input-path list. Surfaced before any file is touched.
    #[error("input paths must be a non-empty list of scan files")]
    EmptyInput,

    /// A pipeline stage was invoked before the stage it depends on.
    #[error("'{stage}' requires '{requires}' to have run first")]
    Precondition {
        stage: &'static str,
        requires: &'static str,
    },
}

/// Result type alias for reflscan operations.
pub type Result<T> = std::result::Result<T, Error>;
