//! Shared utilities for pandect crates.
//!
//! - [`polars`]: `AnyValue` conversions and column helpers used by every
//!   writer that turns a `DataFrame` into another representation.

pub mod polars;

pub use crate::polars::{
    ColumnKind, any_to_f64, any_to_string, column_f64_values, column_kind, column_string_values,
    format_numeric, parse_f64,
};
