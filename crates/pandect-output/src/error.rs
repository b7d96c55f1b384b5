//! Error types for dataset saving.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a dataset.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Failed to create or write the destination file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars CSV writer failure.
    #[error("failed to write {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// Workbook writer failure.
    #[error("failed to write workbook {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// SPSS system file error.
    #[error("failed to write SPSS file: {0}")]
    Sav(#[from] pandect_sav::SavError),

    /// Stata data file error.
    #[error("failed to write Stata file: {0}")]
    Dta(#[from] pandect_dta::DtaError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for SaveError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for save operations.
pub type Result<T> = std::result::Result<T, SaveError>;
