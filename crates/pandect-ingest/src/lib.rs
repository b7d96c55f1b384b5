//! Dataset loading for pandect.
//!
//! This crate turns a path into a Polars DataFrame plus a [`Metadata`]
//! container, choosing the reader from the path suffix.
//!
//! # Features
//!
//! - **Delimited text**: `.csv` (configurable separator) and `.tsv`
//! - **Workbooks**: first worksheet of `.xlsx`, dtypes inferred per column
//! - **Statistical files**: `.sav` and `.dta`, with labels and value labels
//! - **SQLite**: one table from a `.sqlite3` database, opened read-only
//! - **Path expansion**: `~` and `$VAR` / `${VAR}`
//!
//! # Example
//!
//! ```no_run
//! use pandect_ingest::{LoadOptions, load};
//!
//! let (df, meta) = load("~/data/survey.sav", &LoadOptions::default())?;
//! println!("{} rows, {} labelled columns", df.height(), meta.column_labels.len());
//!
//! let options = LoadOptions::default().with_table("people");
//! let (people, _) = load("$HOME/app.sqlite3", &options)?;
//! # Ok::<(), pandect_ingest::LoadError>(())
//! ```
//!
//! [`Metadata`]: pandect_model::Metadata

mod error;
mod load;
mod options;
mod readers;
mod source;

// === Error Types ===
pub use error::{LoadError, Result};

// === Loading ===
pub use load::load;
pub use options::LoadOptions;
pub use source::{Source, expand_path};

// === Format Readers ===
pub use readers::{
    measure_level, metadata_from_dta, metadata_from_sav, quote_identifier, read_delimited,
    read_dta_file, read_first_worksheet, read_sav_file, read_sqlite_table,
};
