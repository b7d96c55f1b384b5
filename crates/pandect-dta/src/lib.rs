//! Stata (`.dta`) reader and writer.
//!
//! Reads the XML-tagged formats of releases 117 (Stata 13), 118 (Stata 14
//! to 18) and 119 (more than 32,767 variables). Writes release 118.
//! Older binary releases are rejected with
//! [`DtaError::UnsupportedRelease`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pandect_dta::{DtaDataset, DtaType, DtaValue, DtaVariable, LabelSet, read_dta, write_dta};
//!
//! let mut ds = DtaDataset::with_variables(vec![
//!     DtaVariable::new("sex", DtaType::Byte)
//!         .with_label("Sex of respondent")
//!         .with_value_label("sex"),
//!     DtaVariable::new("city", DtaType::Str(20)),
//! ])
//! .with_label_set(LabelSet::new("sex").with_entry(1, "Male").with_entry(2, "Female"));
//! ds.add_row(vec![DtaValue::numeric(1.0), DtaValue::text("Lisbon")]);
//! write_dta(Path::new("survey.dta"), &ds).unwrap();
//!
//! let back = read_dta(Path::new("survey.dta")).unwrap();
//! assert_eq!(back.release, 118);
//! ```

mod cursor;
mod error;
mod missing;
mod reader;
mod release;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{DtaError, Result};
pub use release::WRITE_RELEASE;
pub use types::{DtaDataset, DtaType, DtaValue, DtaVariable, DtaWriterOptions, LabelSet};

pub use reader::{DtaReader, parse_dta_data, read_dta};

pub use writer::{
    DtaWriter, MAX_LABEL_CHARS, MAX_NAME_CHARS, validate_dataset, write_dta,
    write_dta_with_options,
};
