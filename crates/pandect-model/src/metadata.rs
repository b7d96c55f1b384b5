//! Descriptive metadata carried alongside a loaded dataset.
//!
//! Statistical package files (SPSS, Stata) store variable labels, value
//! labels and measurement levels next to the data. Formats without such
//! information produce an empty [`Metadata`]; there is no separate "absent"
//! state, so consumers never need to distinguish the two.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared measurement level of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureLevel {
    /// Unordered categories.
    Nominal,
    /// Ordered categories.
    Ordinal,
    /// Interval or ratio scale ("scale" in SPSS).
    Continuous,
    /// Not declared.
    #[default]
    Unknown,
}

impl MeasureLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureLevel::Nominal => "nominal",
            MeasureLevel::Ordinal => "ordinal",
            MeasureLevel::Continuous => "continuous",
            MeasureLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MeasureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MeasureLevel {
    type Err = String;

    /// Accepts SPSS vocabulary as well (`scale` is continuous).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "nominal" => Ok(MeasureLevel::Nominal),
            "ordinal" => Ok(MeasureLevel::Ordinal),
            "continuous" | "scale" => Ok(MeasureLevel::Continuous),
            "unknown" | "" => Ok(MeasureLevel::Unknown),
            _ => Err(format!("Unknown measurement level: {s}")),
        }
    }
}

/// The coded value side of a value label.
#[derive(Debug, Clone)]
pub enum ValueCode {
    Number(f64),
    Text(String),
}

impl ValueCode {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ValueCode::Number(value) => Some(*value),
            ValueCode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ValueCode::Number(_) => None,
            ValueCode::Text(text) => Some(text),
        }
    }
}

impl PartialEq for ValueCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ValueCode {}

impl PartialOrd for ValueCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Numbers sort before text.
impl Ord for ValueCode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ValueCode::Number(a), ValueCode::Number(b)) => a.total_cmp(b),
            (ValueCode::Number(_), ValueCode::Text(_)) => Ordering::Less,
            (ValueCode::Text(_), ValueCode::Number(_)) => Ordering::Greater,
            (ValueCode::Text(a), ValueCode::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for ValueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCode::Number(value) => write!(f, "{value}"),
            ValueCode::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<f64> for ValueCode {
    fn from(value: f64) -> Self {
        ValueCode::Number(value)
    }
}

impl From<i32> for ValueCode {
    fn from(value: i32) -> Self {
        ValueCode::Number(f64::from(value))
    }
}

impl From<&str> for ValueCode {
    fn from(value: &str) -> Self {
        ValueCode::Text(value.to_string())
    }
}

impl From<String> for ValueCode {
    fn from(value: String) -> Self {
        ValueCode::Text(value)
    }
}

/// Value-label dictionary for one column.
pub type ValueLabels = BTreeMap<ValueCode, String>;

/// Metadata container paired with every loaded dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Column name to display label.
    pub column_labels: BTreeMap<String, String>,
    /// Column name to value-label dictionary.
    pub value_labels: BTreeMap<String, ValueLabels>,
    /// Column name to the name of its value-label set. Stata files share
    /// one named set between several variables.
    pub label_sets: BTreeMap<String, String>,
    /// Column name to declared measurement level.
    pub measures: BTreeMap<String, MeasureLevel>,
    /// Dataset-level label, if the file carries one.
    pub file_label: Option<String>,
    /// Character encoding declared by the file.
    pub file_encoding: Option<String>,
}

impl Metadata {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no labels, value labels, or measures are present.
    pub fn is_empty(&self) -> bool {
        self.column_labels.is_empty()
            && self.value_labels.is_empty()
            && self.measures.is_empty()
            && self.label_sets.is_empty()
            && self.file_label.is_none()
    }

    pub fn label_for(&self, column: &str) -> Option<&str> {
        self.column_labels.get(column).map(String::as_str)
    }

    pub fn value_labels_for(&self, column: &str) -> Option<&ValueLabels> {
        self.value_labels.get(column).filter(|labels| !labels.is_empty())
    }

    /// Name of the value-label set attached to `column`, if recorded.
    pub fn label_set_for(&self, column: &str) -> Option<&str> {
        self.label_sets.get(column).map(String::as_str)
    }

    /// Measurement level for `column`, `Unknown` when undeclared.
    pub fn measure_for(&self, column: &str) -> MeasureLevel {
        self.measures.get(column).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn with_label(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.column_labels.insert(column.into(), label.into());
        self
    }

    #[must_use]
    pub fn with_value_label(
        mut self,
        column: impl Into<String>,
        code: impl Into<ValueCode>,
        label: impl Into<String>,
    ) -> Self {
        self.value_labels
            .entry(column.into())
            .or_default()
            .insert(code.into(), label.into());
        self
    }

    #[must_use]
    pub fn with_label_set(mut self, column: impl Into<String>, set: impl Into<String>) -> Self {
        self.label_sets.insert(column.into(), set.into());
        self
    }

    #[must_use]
    pub fn with_measure(mut self, column: impl Into<String>, measure: MeasureLevel) -> Self {
        self.measures.insert(column.into(), measure);
        self
    }

    #[must_use]
    pub fn with_file_label(mut self, label: impl Into<String>) -> Self {
        self.file_label = Some(label.into());
        self
    }

    /// Drops entries for columns not listed in `columns`.
    pub fn retain_columns<S: AsRef<str>>(&mut self, columns: &[S]) {
        let keep = |name: &String| columns.iter().any(|column| column.as_ref() == name);
        self.column_labels.retain(|name, _| keep(name));
        self.value_labels.retain(|name, _| keep(name));
        self.measures.retain(|name, _| keep(name));
        self.label_sets.retain(|name, _| keep(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_from_str() {
        assert_eq!("scale".parse::<MeasureLevel>().unwrap(), MeasureLevel::Continuous);
        assert_eq!("NOMINAL".parse::<MeasureLevel>().unwrap(), MeasureLevel::Nominal);
        assert!("interval".parse::<MeasureLevel>().is_err());
    }

    #[test]
    fn test_value_code_order() {
        let mut codes = vec![
            ValueCode::from("b"),
            ValueCode::from(2.0),
            ValueCode::from("a"),
            ValueCode::from(-1.0),
        ];
        codes.sort();
        assert_eq!(
            codes,
            vec![
                ValueCode::Number(-1.0),
                ValueCode::Number(2.0),
                ValueCode::Text("a".to_string()),
                ValueCode::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_retain_columns() {
        let mut meta = Metadata::new()
            .with_label("age", "Age")
            .with_label("gone", "Dropped")
            .with_value_label("gone", 1.0, "Yes")
            .with_label_set("gone", "yesno")
            .with_measure("gone", MeasureLevel::Nominal)
            .with_file_label("Survey");

        meta.retain_columns(&["age", "other"]);
        assert_eq!(meta.label_for("age"), Some("Age"));
        assert_eq!(meta.label_for("gone"), None);
        assert!(meta.value_labels.is_empty());
        assert!(meta.label_sets.is_empty());
        assert!(meta.measures.is_empty());
        assert_eq!(meta.file_label.as_deref(), Some("Survey"));
    }

    #[test]
    fn test_empty_value_labels_are_absent() {
        let mut meta = Metadata::new();
        meta.value_labels.insert("x".to_string(), ValueLabels::new());
        assert!(meta.value_labels_for("x").is_none());
    }
}
