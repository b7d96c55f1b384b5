//! Result of a save call.

use std::fmt;
use std::path::PathBuf;

use pandect_model::FileFormat;

/// What a save call did.
///
/// A destination with no writable suffix is not an error: nothing is
/// written and the call reports [`SaveOutcome::Skipped`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The dataset was written.
    Written { path: PathBuf, format: FileFormat },
    /// No writer matched the destination; no file was touched.
    Skipped { reason: String },
}

impl SaveOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SaveOutcome::Written { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SaveOutcome::Skipped { .. })
    }

    /// Path written, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SaveOutcome::Written { path, .. } => Some(path),
            SaveOutcome::Skipped { .. } => None,
        }
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Written { path, format } => {
                write!(f, "wrote {} ({format})", path.display())
            }
            SaveOutcome::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}
