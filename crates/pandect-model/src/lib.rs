//! Shared types for pandect crates.
//!
//! - [`FileFormat`] and [`classify`]: suffix-based format identification
//! - [`Metadata`]: labels, value labels and measurement levels

pub mod format;
pub mod metadata;

pub use format::{FileFormat, MatchCase, classify, classify_writable};
pub use metadata::{MeasureLevel, Metadata, ValueCode, ValueLabels};
