//! Suffix dispatch from a source to a format reader.

use std::path::{Path, PathBuf};

use pandect_model::{FileFormat, Metadata, classify};
use polars::prelude::DataFrame;

use crate::error::{LoadError, Result};
use crate::options::LoadOptions;
use crate::readers::{
    read_delimited, read_dta_file, read_first_worksheet, read_sav_file, read_sqlite_table,
};
use crate::source::{Source, expand_path};

/// Loads a dataset and its metadata.
///
/// The path is expanded (unless disabled), checked for existence, and
/// classified by suffix. Formats without embedded metadata return an empty
/// [`Metadata`]. Every failure is logged at error level before it is
/// returned.
///
/// # Errors
///
/// - [`LoadError::UnrecognizedSource`] for non-path sources
/// - [`LoadError::FileNotFound`] when the expanded path does not exist
/// - [`LoadError::MissingTable`] for `.sqlite3` without a table name
/// - [`LoadError::UnrecognizedFormat`] for unknown suffixes
/// - reader errors otherwise
pub fn load(source: impl Into<Source>, options: &LoadOptions) -> Result<(DataFrame, Metadata)> {
    let source = source.into();
    let span = tracing::info_span!("load", source = %source);
    let _guard = span.enter();

    match load_source(&source, options) {
        Ok((df, meta)) => {
            tracing::info!(
                columns = df.width(),
                rows = df.height(),
                labelled = !meta.is_empty(),
                "loaded data"
            );
            Ok((df, meta))
        }
        Err(err) => {
            tracing::error!(error = %err, "load failed");
            Err(err)
        }
    }
}

fn load_source(source: &Source, options: &LoadOptions) -> Result<(DataFrame, Metadata)> {
    let Source::Path(raw) = source else {
        return Err(LoadError::UnrecognizedSource {
            location: source.to_string(),
        });
    };
    tracing::info!(source = %raw, "data source");

    let resolved = if options.expand {
        expand_path(raw)
    } else {
        raw.clone()
    };
    let path = PathBuf::from(&resolved);
    if !path.exists() {
        return Err(LoadError::FileNotFound { path });
    }

    let format = classify(&resolved, options.match_case)
        .ok_or_else(|| LoadError::UnrecognizedFormat { path: path.clone() })?;
    tracing::debug!(format = %format, "classified source");

    read_format(format, &path, options)
}

fn read_format(
    format: FileFormat,
    path: &Path,
    options: &LoadOptions,
) -> Result<(DataFrame, Metadata)> {
    match format {
        FileFormat::Csv => Ok((read_delimited(path, options.separator)?, Metadata::new())),
        FileFormat::Tsv => Ok((read_delimited(path, b'\t')?, Metadata::new())),
        FileFormat::Xlsx => Ok((read_first_worksheet(path)?, Metadata::new())),
        FileFormat::Sav => read_sav_file(path),
        FileFormat::Dta => {
            tracing::warn!(path = %path.display(), "dta reader loads dates as raw numbers and every missing code as null");
            read_dta_file(path)
        }
        FileFormat::Sqlite => {
            let table = options
                .table
                .as_deref()
                .filter(|table| !table.is_empty())
                .ok_or(LoadError::MissingTable)?;
            Ok((read_sqlite_table(path, table)?, Metadata::new()))
        }
    }
}
