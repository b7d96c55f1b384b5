//! Command-line components shared by the `pandect` and `sav2dta` binaries.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
