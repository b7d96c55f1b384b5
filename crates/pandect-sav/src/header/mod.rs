//! System file header and dictionary records.
//!
//! A `.sav` file is laid out as:
//! - a 176-byte file header
//! - variable records (type 2), one per 8-byte slot
//! - value label records (types 3 and 4)
//! - extension records (type 7) keyed by subtype
//! - a dictionary terminator (type 999)
//! - case data, raw or bytecode-compressed

pub mod bytes;
pub mod file;
pub mod records;

pub use bytes::{ByteReader, Endian};
pub use file::{BIAS, FILE_HEADER_LEN, FileHeader, MAGIC, SYSMIS};
pub use records::{DisplayParam, ExtensionRecord, LongStringLabels, RawVariable};

/// Record type codes.
pub const REC_VARIABLE: i32 = 2;
pub const REC_VALUE_LABELS: i32 = 3;
pub const REC_VALUE_LABEL_VARS: i32 = 4;
pub const REC_DOCUMENT: i32 = 6;
pub const REC_EXTENSION: i32 = 7;
pub const REC_END: i32 = 999;

/// Extension record subtypes.
pub const EXT_INTEGER_INFO: i32 = 3;
pub const EXT_FLOAT_INFO: i32 = 4;
pub const EXT_DISPLAY: i32 = 11;
pub const EXT_LONG_NAMES: i32 = 13;
pub const EXT_VERY_LONG_STRINGS: i32 = 14;
pub const EXT_ENCODING: i32 = 20;
pub const EXT_LONG_STRING_LABELS: i32 = 21;

/// Pad `bytes` with `fill` up to `len`, truncating if longer.
pub fn fixed(bytes: &[u8], len: usize, fill: u8) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(len)].to_vec();
    out.resize(len, fill);
    out
}

/// Truncate a UTF-8 string to at most `max` bytes on a char boundary.
pub fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Strip trailing spaces and NULs left by fixed-width fields.
pub fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != b' ' && *b != 0)
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed() {
        assert_eq!(fixed(b"AB", 4, b' '), b"AB  ");
        assert_eq!(fixed(b"ABCDEF", 4, b' '), b"ABCD");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("héllo", 2), "h");
    }

    #[test]
    fn test_trim_padding() {
        assert_eq!(trim_padding(b"abc  \0\0"), b"abc");
        assert_eq!(trim_padding(b"   "), b"");
    }
}
