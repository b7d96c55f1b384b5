//! Dataset container.

use super::{SavValue, SavVariable};

/// A decoded `.sav` file: dictionary plus row-major cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavDataset {
    /// File label from the header (up to 64 bytes).
    pub file_label: Option<String>,
    /// Character encoding name declared by the file.
    pub encoding: Option<String>,
    pub variables: Vec<SavVariable>,
    pub rows: Vec<Vec<SavValue>>,
}

impl SavDataset {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variables(variables: Vec<SavVariable>) -> Self {
        Self {
            variables,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_file_label(mut self, label: impl Into<String>) -> Self {
        self.file_label = Some(label.into());
        self
    }

    pub fn add_row(&mut self, row: Vec<SavValue>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable(&self, name: &str) -> Option<&SavVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Values of one variable, in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &SavValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
