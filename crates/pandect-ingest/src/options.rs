//! Load options.

use pandect_model::MatchCase;

/// Options controlling a single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field separator for `.csv` sources. `.tsv` always uses a tab.
    pub separator: u8,
    /// Expand `~` and environment variables in the path.
    pub expand: bool,
    /// Case policy for suffix matching.
    pub match_case: MatchCase,
    /// Table to read from a `.sqlite3` source.
    pub table: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            expand: true,
            match_case: MatchCase::Insensitive,
            table: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    #[must_use]
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    #[must_use]
    pub fn with_match_case(mut self, match_case: MatchCase) -> Self {
        self.match_case = match_case;
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}
