//! File format identification from path suffixes.
//!
//! Classification is a pure function of the path text and a [`MatchCase`]
//! policy. Nothing is cached: the format is derived again on every load or
//! save.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tabular file formats recognized by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma-separated text (`.csv`).
    Csv,
    /// Tab-separated text (`.tsv`).
    Tsv,
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// SPSS system file (`.sav`).
    Sav,
    /// Stata data file (`.dta`).
    Dta,
    /// SQLite database (`.sqlite3`), load-only.
    Sqlite,
}

/// Case policy for suffix matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchCase {
    /// `DATA.CSV` and `data.csv` both match `.csv`.
    #[default]
    Insensitive,
    /// Only the exact lowercase suffix matches.
    Sensitive,
}

impl FileFormat {
    /// Every recognized format, in suffix-table order.
    pub const ALL: [FileFormat; 6] = [
        FileFormat::Csv,
        FileFormat::Tsv,
        FileFormat::Xlsx,
        FileFormat::Sav,
        FileFormat::Dta,
        FileFormat::Sqlite,
    ];

    /// The suffix bound to this format, including the leading dot.
    pub fn suffix(&self) -> &'static str {
        match self {
            FileFormat::Csv => ".csv",
            FileFormat::Tsv => ".tsv",
            FileFormat::Xlsx => ".xlsx",
            FileFormat::Sav => ".sav",
            FileFormat::Dta => ".dta",
            FileFormat::Sqlite => ".sqlite3",
        }
    }

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Tsv => "tsv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Sav => "sav",
            FileFormat::Dta => "dta",
            FileFormat::Sqlite => "sqlite3",
        }
    }

    /// Returns true if a writer exists for this format.
    pub fn is_writable(&self) -> bool {
        !matches!(self, FileFormat::Sqlite)
    }

    /// Returns true if files of this format embed labels or measurement levels.
    pub fn carries_metadata(&self) -> bool {
        matches!(self, FileFormat::Sav | FileFormat::Dta)
    }

    /// Field separator for delimited text formats.
    pub fn separator(&self) -> Option<u8> {
        match self {
            FileFormat::Csv => Some(b','),
            FileFormat::Tsv => Some(b'\t'),
            _ => None,
        }
    }

    /// Returns true if `path` ends with this format's suffix.
    pub fn matches(&self, path: &str, case: MatchCase) -> bool {
        let suffix = self.suffix().as_bytes();
        let path = path.as_bytes();
        if path.len() < suffix.len() {
            return false;
        }
        let tail = &path[path.len() - suffix.len()..];
        match case {
            MatchCase::Insensitive => tail.eq_ignore_ascii_case(suffix),
            MatchCase::Sensitive => tail == suffix,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    /// Parse a format name, with or without the leading dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "sav" => Ok(FileFormat::Sav),
            "dta" => Ok(FileFormat::Dta),
            "sqlite3" | "sqlite" => Ok(FileFormat::Sqlite),
            _ => Err(format!("Unknown file format: {s}")),
        }
    }
}

/// Classify `path` by its suffix.
///
/// Matching is anchored at the end of the string, so `data.csv.bak` is
/// unmatched. Returns `None` when no suffix matches; there is no default.
pub fn classify(path: &str, case: MatchCase) -> Option<FileFormat> {
    FileFormat::ALL
        .into_iter()
        .find(|format| format.matches(path, case))
}

/// Classify `path` among the formats that have a writer.
pub fn classify_writable(path: &str, case: MatchCase) -> Option<FileFormat> {
    classify(path, case).filter(FileFormat::is_writable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_table() {
        for format in FileFormat::ALL {
            let path = format!("dir/data{}", format.suffix());
            assert_eq!(classify(&path, MatchCase::Insensitive), Some(format));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("CSV".parse::<FileFormat>().unwrap(), FileFormat::Csv);
        assert_eq!(".dta".parse::<FileFormat>().unwrap(), FileFormat::Dta);
        assert_eq!("sqlite".parse::<FileFormat>().unwrap(), FileFormat::Sqlite);
        assert!("parquet".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_short_path_does_not_match() {
        assert_eq!(classify("sav", MatchCase::Insensitive), None);
        assert_eq!(classify("", MatchCase::Insensitive), None);
    }
}
