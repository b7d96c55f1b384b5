//! Cell values.

use std::fmt;

/// A single cell in a `.sav` dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum SavValue {
    /// Numeric value; `None` is the system-missing value.
    Number(Option<f64>),
    /// String value without trailing padding.
    Text(String),
}

impl SavValue {
    /// Create a numeric value.
    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Number(Some(value))
    }

    /// Create a system-missing numeric value.
    #[must_use]
    pub fn missing() -> Self {
        Self::Number(None)
    }

    /// Create a string value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for system-missing numbers.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Number(None))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => *value,
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for SavValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(Some(value)) => write!(f, "{value}"),
            Self::Number(None) => write!(f, "."),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<f64> for SavValue {
    fn from(value: f64) -> Self {
        Self::numeric(value)
    }
}

impl From<Option<f64>> for SavValue {
    fn from(value: Option<f64>) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SavValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for SavValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
