//! Error types for dataset loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    // === Source Errors ===
    /// The source is not a filesystem path.
    #[error("unrecognized data source: {location}")]
    UnrecognizedSource { location: String },

    /// The expanded path does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The path suffix matches no known format.
    #[error("unrecognized file type: {path}")]
    UnrecognizedFormat { path: PathBuf },

    /// A SQLite source was given without a table name.
    #[error("missing table specification for sqlite")]
    MissingTable,

    // === Reader Errors ===
    /// Failed to parse delimited text with Polars.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to open or read a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// The workbook has no worksheet.
    #[error("workbook has no worksheets: {path}")]
    EmptyWorksheet { path: PathBuf },

    /// SPSS system file error.
    #[error("failed to read SPSS file: {0}")]
    Sav(#[from] pandect_sav::SavError),

    /// Stata data file error.
    #[error("failed to read Stata file: {0}")]
    Dta(#[from] pandect_dta::DtaError),

    /// SQLite error, passed through unchanged.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for LoadError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
