//! Core types for SPSS system file handling.

mod dataset;
mod options;
mod value;
mod variable;

pub use dataset::SavDataset;
pub use options::{Compression, SavReaderOptions, SavWriterOptions};
pub use value::SavValue;
pub(crate) use variable::chunks_for;
pub use variable::{
    LabelValue, Measure, MissingValues, SavFormat, SavVariable, ValueLabel, VarWidth,
};
