//! Suffix dispatch from a destination to a format writer.

use std::path::{Path, PathBuf};

use pandect_model::{FileFormat, MatchCase, Metadata, classify_writable};
use polars::prelude::DataFrame;

use crate::error::Result;
use crate::outcome::SaveOutcome;
use crate::writers::{write_delimited, write_dta_file, write_sav_file, write_workbook};

/// Writes `data` to `destination`, choosing the writer from the suffix.
///
/// `.sav` and `.dta` outputs carry labels from `meta`; `None` is treated as
/// empty metadata. A destination with no writable suffix (including
/// `.sqlite3`) is logged at error level and reported as
/// [`SaveOutcome::Skipped`] without touching the filesystem.
///
/// # Errors
///
/// Returns an error when the selected writer fails. The failure is logged
/// at error level first.
pub fn save(
    data: &mut DataFrame,
    destination: &str,
    meta: Option<&Metadata>,
    case: MatchCase,
) -> Result<SaveOutcome> {
    let span = tracing::info_span!("save", destination = %destination);
    let _guard = span.enter();

    let Some(format) = classify_writable(destination, case) else {
        let reason = format!("unknown output format: {destination}");
        tracing::error!("{reason}");
        return Ok(SaveOutcome::Skipped { reason });
    };

    let meta = scoped_metadata(data, meta);
    let path = PathBuf::from(destination);

    match write_format(format, data, &path, &meta) {
        Ok(()) => {
            tracing::info!(format = %format, rows = data.height(), "wrote {destination}");
            Ok(SaveOutcome::Written { path, format })
        }
        Err(err) => {
            tracing::error!(format = %format, error = %err, "save failed");
            Err(err)
        }
    }
}

/// Metadata restricted to the columns of `data`. `None` gives an empty
/// container.
fn scoped_metadata(data: &DataFrame, meta: Option<&Metadata>) -> Metadata {
    let Some(meta) = meta else {
        return Metadata::new();
    };
    let mut scoped = meta.clone();
    scoped.retain_columns(&data.get_column_names_str());
    if scoped != *meta {
        tracing::debug!("dropped metadata for columns not in the data");
    }
    scoped
}

fn write_format(
    format: FileFormat,
    data: &mut DataFrame,
    path: &Path,
    meta: &Metadata,
) -> Result<()> {
    match format {
        FileFormat::Csv | FileFormat::Tsv => {
            let separator = format.separator().unwrap_or(b',');
            write_delimited(data, path, separator)
        }
        FileFormat::Xlsx => write_workbook(data, path),
        FileFormat::Sav => write_sav_file(data, path, meta),
        FileFormat::Dta => write_dta_file(data, path, meta),
        // Load-only; classify_writable never yields it.
        FileFormat::Sqlite => Ok(()),
    }
}
