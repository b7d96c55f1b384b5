//! Dataset saving for pandect.
//!
//! [`save`] writes a Polars DataFrame to `.csv`, `.tsv`, `.xlsx`, `.sav` or
//! `.dta`, chosen by the destination suffix. SPSS and Stata outputs carry
//! variable labels and value labels from a [`Metadata`] container; SPSS
//! outputs also carry measurement levels.
//!
//! # Example
//!
//! ```no_run
//! use pandect_model::{MatchCase, Metadata};
//! use pandect_output::save;
//! use polars::prelude::*;
//!
//! let mut df = df! { "id" => [1i64, 2], "name" => ["Alice", "Bob"] }?;
//! let meta = Metadata::new().with_label("id", "Respondent");
//!
//! let outcome = save(&mut df, "out.sav", Some(&meta), MatchCase::Insensitive)?;
//! assert!(outcome.is_written());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`Metadata`]: pandect_model::Metadata

mod error;
mod outcome;
mod save;
mod writers;

// === Error Types ===
pub use error::{Result, SaveError};

// === Saving ===
pub use outcome::SaveOutcome;
pub use save::save;

// === Format Writers ===
pub use writers::{
    dta_dataset, sav_dataset, sav_measure, write_delimited, write_dta_file, write_sav_file,
    write_workbook,
};
