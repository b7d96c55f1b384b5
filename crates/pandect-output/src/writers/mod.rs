//! Format-specific writers.

mod csv;
mod dta;
mod sav;
mod xlsx;

pub use csv::write_delimited;
pub use dta::{dta_dataset, write_dta_file};
pub use sav::{sav_dataset, sav_measure, write_sav_file};
pub use xlsx::write_workbook;
