//! Delimited text reading.

use std::path::Path;

use polars::prelude::*;

use crate::error::{LoadError, Result};

/// Reads a delimited text file with a single header row.
///
/// Column dtypes are inferred from every row, so a late non-numeric value
/// turns the column into strings instead of failing the read.
pub fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| LoadError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| LoadError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
