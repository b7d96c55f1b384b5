//! Load tabular datasets from csv, tsv, xlsx, sav, dta and sqlite3 files
//! and save them as csv, tsv, xlsx, sav or dta.
//!
//! The format is always chosen from the file suffix. Statistical files
//! (`.sav`, `.dta`) carry variable labels and value labels, which are kept
//! in a [`Metadata`] container next to the data and written back out when
//! saving to a format that can hold them.
//!
//! # Example
//!
//! ```no_run
//! use pandect::{LoadOptions, Pandect};
//!
//! let dataset = Pandect::open("~/survey.sav", LoadOptions::default())?;
//! println!("{:?}", dataset.data().shape());
//! dataset.save("survey.dta")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The free functions [`load`] and [`save`] do the same without a handle.

mod dataset;

pub use dataset::Pandect;

pub use pandect_ingest::{LoadError, LoadOptions, Source, expand_path, load};
pub use pandect_model::{
    FileFormat, MatchCase, MeasureLevel, Metadata, ValueCode, ValueLabels, classify,
    classify_writable,
};
pub use pandect_output::{SaveError, SaveOutcome, save};
