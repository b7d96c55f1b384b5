//! The loaded-dataset handle.

use pandect_ingest::{LoadError, LoadOptions, Source, load};
use pandect_model::{MatchCase, Metadata};
use pandect_output::{SaveError, SaveOutcome, save};
use polars::prelude::DataFrame;

/// A dataset loaded once from a source, together with its metadata.
///
/// The handle owns a snapshot of the file taken at [`Pandect::open`]; later
/// changes to the file are not seen. It has no mutating operations.
#[derive(Debug, Clone)]
pub struct Pandect {
    source: Source,
    match_case: MatchCase,
    data: DataFrame,
    meta: Metadata,
}

impl Pandect {
    /// Loads `source` with `options`.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] from the loader; no handle is created.
    pub fn open(source: impl Into<Source>, options: LoadOptions) -> Result<Self, LoadError> {
        let source = source.into();
        let (data, meta) = load(source.clone(), &options)?;
        tracing::debug!(source = %source, "opened dataset");
        Ok(Self {
            source,
            match_case: options.match_case,
            data,
            meta,
        })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// The source as given to [`Pandect::open`], before expansion.
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn into_parts(self) -> (DataFrame, Metadata) {
        (self.data, self.meta)
    }

    /// Saves the data and its metadata to `destination`, using the same
    /// suffix case policy as the load.
    ///
    /// # Errors
    ///
    /// Writer failures. An unrecognized destination is not an error; see
    /// [`SaveOutcome::Skipped`].
    pub fn save(&self, destination: &str) -> Result<SaveOutcome, SaveError> {
        let mut data = self.data.clone();
        save(&mut data, destination, Some(&self.meta), self.match_case)
    }
}
