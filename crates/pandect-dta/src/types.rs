//! Core types for Stata datasets.

use std::fmt;

use chrono::NaiveDateTime;

/// Storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtaType {
    /// 1-byte integer, valid range -127..=100.
    Byte,
    /// 2-byte integer, valid range -32767..=32740.
    Int,
    /// 4-byte integer, valid range -2147483647..=2147483620.
    Long,
    Float,
    Double,
    /// Fixed-width string of 1..=2045 bytes.
    Str(u16),
    /// Arbitrary-length string stored in the strL section.
    StrL,
}

impl DtaType {
    pub const MAX_STR: u16 = 2045;

    /// Storage type code used by releases 117 and later.
    pub fn code(self) -> u16 {
        match self {
            Self::Str(width) => width,
            Self::StrL => 32768,
            Self::Double => 65526,
            Self::Float => 65527,
            Self::Long => 65528,
            Self::Int => 65529,
            Self::Byte => 65530,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1..=2045 => Some(Self::Str(code)),
            32768 => Some(Self::StrL),
            65526 => Some(Self::Double),
            65527 => Some(Self::Float),
            65528 => Some(Self::Long),
            65529 => Some(Self::Int),
            65530 => Some(Self::Byte),
            _ => None,
        }
    }

    /// Bytes per value in a data row.
    pub fn width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Int => 2,
            Self::Long | Self::Float => 4,
            Self::Double | Self::StrL => 8,
            Self::Str(width) => usize::from(width),
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Str(_) | Self::StrL)
    }

    /// Stata's default display format for the type.
    pub fn default_format(self) -> String {
        match self {
            Self::Byte | Self::Int => "%8.0g".to_string(),
            Self::Long => "%12.0g".to_string(),
            Self::Float => "%9.0g".to_string(),
            Self::Double => "%10.0g".to_string(),
            Self::Str(width) => format!("%{width}s"),
            Self::StrL => "%9s".to_string(),
        }
    }

    /// Smallest integer type holding every value in `min..=max`, if any.
    pub fn smallest_integer(min: f64, max: f64) -> Option<Self> {
        if min >= -127.0 && max <= 100.0 {
            Some(Self::Byte)
        } else if min >= -32767.0 && max <= 32740.0 {
            Some(Self::Int)
        } else if min >= -2_147_483_647.0 && max <= 2_147_483_620.0 {
            Some(Self::Long)
        } else {
            None
        }
    }
}

impl fmt::Display for DtaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => write!(f, "byte"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Str(width) => write!(f, "str{width}"),
            Self::StrL => write!(f, "strL"),
        }
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DtaValue {
    /// Numeric value; `None` for any of the 27 missing codes.
    Number(Option<f64>),
    Text(String),
}

impl DtaValue {
    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Number(Some(value))
    }

    #[must_use]
    pub fn missing() -> Self {
        Self::Number(None)
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
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

/// A variable definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DtaVariable {
    pub name: String,
    pub dtype: DtaType,
    pub format: String,
    pub label: Option<String>,
    /// Name of the attached value-label set.
    pub value_label: Option<String>,
}

impl DtaVariable {
    #[must_use]
    pub fn new(name: impl Into<String>, dtype: DtaType) -> Self {
        Self {
            name: name.into(),
            dtype,
            format: dtype.default_format(),
            label: None,
            value_label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_value_label(mut self, set: impl Into<String>) -> Self {
        self.value_label = Some(set.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

/// A named value-label table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelSet {
    pub name: String,
    pub entries: Vec<(i32, String)>,
}

impl LabelSet {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, value: i32, label: impl Into<String>) -> Self {
        self.entries.push((value, label.into()));
        self
    }
}

/// A decoded `.dta` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DtaDataset {
    /// Format release the data was read from (117, 118 or 119).
    pub release: u16,
    pub label: Option<String>,
    pub timestamp: Option<String>,
    pub variables: Vec<DtaVariable>,
    pub label_sets: Vec<LabelSet>,
    pub rows: Vec<Vec<DtaValue>>,
}

impl DtaDataset {
    #[must_use]
    pub fn with_variables(variables: Vec<DtaVariable>) -> Self {
        Self {
            release: 118,
            variables,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_label_set(mut self, set: LabelSet) -> Self {
        self.label_sets.push(set);
        self
    }

    pub fn add_row(&mut self, row: Vec<DtaValue>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn variable(&self, name: &str) -> Option<&DtaVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn label_set(&self, name: &str) -> Option<&LabelSet> {
        self.label_sets.iter().find(|set| set.name == name)
    }

    /// Value labels attached to `variable`, if any.
    pub fn labels_for(&self, variable: &DtaVariable) -> Option<&LabelSet> {
        variable
            .value_label
            .as_deref()
            .and_then(|name| self.label_set(name))
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &DtaValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// Options for writing `.dta` files. Output is always release 118,
/// little-endian.
#[derive(Debug, Clone, Default)]
pub struct DtaWriterOptions {
    /// Timestamp stored in the header (default: current local time).
    pub created: Option<NaiveDateTime>,
}

impl DtaWriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_created(mut self, datetime: NaiveDateTime) -> Self {
        self.created = Some(datetime);
        self
    }
}
