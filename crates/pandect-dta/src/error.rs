//! Error types for Stata file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing `.dta` files.
#[derive(Debug, Error)]
pub enum DtaError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed file.
    #[error("invalid dta file: {message}")]
    InvalidFormat { message: String },

    /// Expected tag missing at the given offset.
    #[error("expected <{tag}> at offset {offset}")]
    MissingTag { tag: &'static str, offset: usize },

    /// Data ended early.
    #[error("unexpected end of file at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Release outside 117..=119 (including the pre-XML binary releases).
    #[error("unsupported dta release {release}")]
    UnsupportedRelease { release: String },

    /// Unknown storage type code.
    #[error("unknown storage type {code} for variable {index}")]
    UnknownType { code: u16, index: usize },

    /// Variable name that Stata cannot store.
    #[error("invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: &'static str },

    /// Duplicate variable name.
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// Value type does not match the storage type.
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

/// Result type alias for `.dta` operations.
pub type Result<T> = std::result::Result<T, DtaError>;

impl DtaError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DtaError::UnsupportedRelease {
            release: "114".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported dta release 114");

        let err = DtaError::MissingTag {
            tag: "header",
            offset: 11,
        };
        assert_eq!(err.to_string(), "expected <header> at offset 11");
    }
}
