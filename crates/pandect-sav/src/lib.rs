//! SPSS system file (`.sav`) reader and writer.
//!
//! # Features
//!
//! - Uncompressed and bytecode-compressed case data
//! - Little- and big-endian input; output is little-endian UTF-8
//! - Variable labels, value labels (including long strings), measurement
//!   levels, user-missing values and the file label
//! - Long variable names and very long strings (> 255 bytes)
//! - Optional Polars DataFrame integration (with `polars` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pandect_sav::{Measure, SavDataset, SavValue, SavVariable, read_sav, write_sav};
//!
//! let mut ds = SavDataset::with_variables(vec![
//!     SavVariable::numeric("sex")
//!         .with_label("Sex of respondent")
//!         .with_value_label(1.0, "Male")
//!         .with_value_label(2.0, "Female")
//!         .with_measure(Measure::Nominal),
//!     SavVariable::string("comment", 40),
//! ]);
//! ds.add_row(vec![SavValue::numeric(1.0), SavValue::text("ok")]);
//! write_sav(Path::new("survey.sav"), &ds).unwrap();
//!
//! let back = read_sav(Path::new("survey.sav")).unwrap();
//! assert_eq!(back.num_rows(), 1);
//! ```

mod compression;
mod error;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{Result, SavError};

pub use types::{
    Compression, LabelValue, Measure, MissingValues, SavDataset, SavFormat, SavReaderOptions,
    SavValue, SavVariable, SavWriterOptions, ValueLabel, VarWidth,
};

pub use reader::{SavReader, parse_sav_data, read_sav, read_sav_with_options};

pub use writer::{
    MAX_NAME_LEN, SavWriter, short_names, validate_dataset, write_sav, write_sav_with_options,
};
