//! Format-specific readers. Each returns a DataFrame and, where the format
//! carries it, the file's metadata.

mod csv;
mod dta;
mod sav;
mod sqlite;
mod xlsx;

pub use csv::read_delimited;
pub use dta::{metadata_from_dta, read_dta_file};
pub use sav::{measure_level, metadata_from_sav, read_sav_file};
pub use sqlite::{quote_identifier, read_sqlite_table};
pub use xlsx::read_first_worksheet;
