//! Error types for SPSS system file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing `.sav` files.
#[derive(Debug, Error)]
pub enum SavError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Not an SPSS system file, or a malformed one.
    #[error("invalid system file: {message}")]
    InvalidFormat { message: String },

    /// Data ended before a record was complete.
    #[error("unexpected end of file at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Unknown record type in the dictionary.
    #[error("unrecognized record type {record_type} at offset {offset}")]
    UnknownRecord { record_type: i32, offset: usize },

    /// Compression scheme not supported by this reader.
    #[error("unsupported compression code {code}")]
    UnsupportedCompression { code: i32 },

    /// Variable name is empty or cannot be stored.
    #[error("invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: &'static str },

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// String variable wider than the format allows.
    #[error("variable {name} has width {width}, maximum is {max}")]
    WidthTooLarge { name: String, width: usize, max: usize },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// Value type does not match the variable type.
    #[error("variable {name} expects {expected} values")]
    TypeMismatch { name: String, expected: &'static str },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame conversion error.
    #[cfg(feature = "polars")]
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type alias for `.sav` operations.
pub type Result<T> = std::result::Result<T, SavError>;

impl SavError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an InvalidVariableName error.
    pub fn invalid_variable_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidVariableName {
            name: name.into(),
            reason,
        }
    }
}
