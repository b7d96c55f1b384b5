//! Variable definitions.

use std::fmt;

/// Storage width of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarWidth {
    /// 8-byte IEEE double.
    Numeric,
    /// Fixed-width string of the given byte length (1..=32767).
    String(u16),
}

impl VarWidth {
    /// Widest string a system file can hold.
    pub const MAX_STRING: u16 = 32767;

    /// Bytes of payload carried by each segment of a very long string.
    pub const SEGMENT_SIZE: usize = 252;

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }

    pub fn is_string(&self) -> bool {
        !self.is_numeric()
    }

    /// Strings wider than 8 bytes need extension records for value labels.
    pub fn is_long_string(&self) -> bool {
        matches!(self, Self::String(w) if *w > 8)
    }

    /// Strings wider than 255 bytes are split into several segments.
    pub fn is_very_long_string(&self) -> bool {
        matches!(self, Self::String(w) if *w > 255)
    }

    pub fn string_width(&self) -> Option<usize> {
        match self {
            Self::Numeric => None,
            Self::String(w) => Some(usize::from(*w)),
        }
    }

    /// Allocated width of each physical segment; `0` for numeric.
    ///
    /// Every segment but the last is 255 bytes wide. The last one holds
    /// whatever the preceding segments leave over, counted in 252-byte steps.
    pub fn segment_widths(&self) -> Vec<usize> {
        match *self {
            Self::Numeric => vec![0],
            Self::String(w) if w <= 255 => vec![usize::from(w)],
            Self::String(w) => {
                let width = usize::from(w);
                let n = width.div_ceil(Self::SEGMENT_SIZE);
                let mut widths = vec![255; n - 1];
                widths.push(width - (n - 1) * Self::SEGMENT_SIZE);
                widths
            }
        }
    }

    /// Number of 8-byte slots this variable occupies in a case.
    pub fn n_chunks(&self) -> usize {
        self.segment_widths().into_iter().map(chunks_for).sum()
    }
}

impl fmt::Display for VarWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::String(w) => write!(f, "string({w})"),
        }
    }
}

/// Number of 8-byte slots for a segment of the given allocated width.
pub(crate) fn chunks_for(width: usize) -> usize {
    if width == 0 { 1 } else { width.div_ceil(8) }
}

/// Measurement level stored in the display-parameter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Measure {
    #[default]
    Unknown,
    Nominal,
    Ordinal,
    Scale,
}

impl Measure {
    pub fn code(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Nominal => 1,
            Self::Ordinal => 2,
            Self::Scale => 3,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Nominal,
            2 => Self::Ordinal,
            3 => Self::Scale,
            _ => Self::Unknown,
        }
    }
}

/// Print/write format, e.g. `F8.2` or `A20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SavFormat {
    /// Format type code (5 = F, 1 = A, others passed through).
    pub kind: u8,
    pub width: u8,
    pub decimals: u8,
}

impl SavFormat {
    pub const A: u8 = 1;
    pub const F: u8 = 5;

    #[must_use]
    pub const fn numeric(width: u8, decimals: u8) -> Self {
        Self {
            kind: Self::F,
            width,
            decimals,
        }
    }

    #[must_use]
    pub const fn string(width: u8) -> Self {
        Self {
            kind: Self::A,
            width,
            decimals: 0,
        }
    }

    /// `F8.2` for numbers, `A<w>` for strings (capped at 255).
    pub fn default_for(width: VarWidth) -> Self {
        match width {
            VarWidth::Numeric => Self::numeric(8, 2),
            VarWidth::String(w) => Self::string(w.min(255) as u8),
        }
    }

    /// Packed representation used in variable records.
    pub fn to_raw(self) -> u32 {
        (u32::from(self.kind) << 16) | (u32::from(self.width) << 8) | u32::from(self.decimals)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self {
            kind: ((raw >> 16) & 0xff) as u8,
            width: ((raw >> 8) & 0xff) as u8,
            decimals: (raw & 0xff) as u8,
        }
    }
}

impl fmt::Display for SavFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Self::A => write!(f, "A{}", self.width),
            Self::F => write!(f, "F{}.{}", self.width, self.decimals),
            other => write!(f, "#{other}:{}.{}", self.width, self.decimals),
        }
    }
}

/// Value side of a value label or user-missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelValue {
    Number(f64),
    Text(String),
}

impl From<f64> for LabelValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A value and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueLabel {
    pub value: LabelValue,
    pub label: String,
}

/// User-defined missing values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MissingValues {
    #[default]
    None,
    /// Up to three discrete values.
    Discrete(Vec<LabelValue>),
    /// Closed numeric range.
    Range { low: f64, high: f64 },
    /// Closed numeric range plus one discrete value.
    RangeAndValue { low: f64, high: f64, value: f64 },
}

impl MissingValues {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Discrete(values) => values.is_empty(),
            _ => false,
        }
    }

    pub fn contains_number(&self, number: f64) -> bool {
        match self {
            Self::None => false,
            Self::Discrete(values) => values
                .iter()
                .any(|v| matches!(v, LabelValue::Number(n) if *n == number)),
            Self::Range { low, high } => (*low..=*high).contains(&number),
            Self::RangeAndValue { low, high, value } => {
                (*low..=*high).contains(&number) || *value == number
            }
        }
    }

    pub fn contains_text(&self, text: &str) -> bool {
        match self {
            Self::Discrete(values) => values
                .iter()
                .any(|v| matches!(v, LabelValue::Text(t) if t.trim_end() == text)),
            _ => false,
        }
    }
}

/// A variable in a `.sav` dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct SavVariable {
    /// Long variable name (up to 64 bytes).
    pub name: String,
    pub width: VarWidth,
    pub label: Option<String>,
    pub value_labels: Vec<ValueLabel>,
    pub measure: Measure,
    pub format: SavFormat,
    pub missing: MissingValues,
}

impl SavVariable {
    /// Create a numeric variable with `F8.2` format.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, VarWidth::Numeric)
    }

    /// Create a string variable of the given byte width.
    #[must_use]
    pub fn string(name: impl Into<String>, width: u16) -> Self {
        Self::new(name, VarWidth::String(width.clamp(1, VarWidth::MAX_STRING)))
    }

    fn new(name: impl Into<String>, width: VarWidth) -> Self {
        Self {
            name: name.into(),
            width,
            label: None,
            value_labels: Vec::new(),
            measure: Measure::Unknown,
            format: SavFormat::default_for(width),
            missing: MissingValues::None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_value_label(mut self, value: impl Into<LabelValue>, label: impl Into<String>) -> Self {
        self.value_labels.push(ValueLabel {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    #[must_use]
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: SavFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_missing(mut self, missing: MissingValues) -> Self {
        self.missing = missing;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.width.is_numeric()
    }

    /// True if `value` is declared user-missing for this variable.
    pub fn is_user_missing(&self, value: &super::SavValue) -> bool {
        match value {
            super::SavValue::Number(Some(n)) => self.missing.contains_number(*n),
            super::SavValue::Number(None) => false,
            super::SavValue::Text(text) => self.missing.contains_text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_widths() {
        assert_eq!(VarWidth::Numeric.segment_widths(), vec![0]);
        assert_eq!(VarWidth::String(10).segment_widths(), vec![10]);
        assert_eq!(VarWidth::String(255).segment_widths(), vec![255]);
        assert_eq!(VarWidth::String(300).segment_widths(), vec![255, 48]);
        assert_eq!(VarWidth::String(504).segment_widths(), vec![255, 252]);
        assert_eq!(VarWidth::String(505).segment_widths(), vec![255, 255, 1]);
    }

    #[test]
    fn test_n_chunks() {
        assert_eq!(VarWidth::Numeric.n_chunks(), 1);
        assert_eq!(VarWidth::String(1).n_chunks(), 1);
        assert_eq!(VarWidth::String(9).n_chunks(), 2);
        assert_eq!(VarWidth::String(300).n_chunks(), 32 + 6);
    }

    #[test]
    fn test_format_raw() {
        let format = SavFormat::numeric(8, 2);
        assert_eq!(format.to_raw(), 0x0005_0802);
        assert_eq!(SavFormat::from_raw(0x0005_0802), format);
        assert_eq!(format.to_string(), "F8.2");
        assert_eq!(SavFormat::default_for(VarWidth::String(300)).to_string(), "A255");
    }

    #[test]
    fn test_missing_values() {
        let missing = MissingValues::RangeAndValue {
            low: 90.0,
            high: 99.0,
            value: -1.0,
        };
        assert!(missing.contains_number(95.0));
        assert!(missing.contains_number(-1.0));
        assert!(!missing.contains_number(5.0));

        let missing = MissingValues::Discrete(vec![LabelValue::from("NA")]);
        assert!(missing.contains_text("NA"));
        assert!(!missing.contains_number(1.0));
    }
}
