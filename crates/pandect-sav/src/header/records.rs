//! Dictionary record building and parsing.

use super::bytes::ByteReader;
use super::file::SYSMIS;
use super::{
    EXT_DISPLAY, EXT_ENCODING, EXT_FLOAT_INFO, EXT_INTEGER_INFO, EXT_LONG_NAMES,
    EXT_LONG_STRING_LABELS, EXT_VERY_LONG_STRINGS, REC_EXTENSION, REC_VALUE_LABEL_VARS,
    REC_VALUE_LABELS, REC_VARIABLE, fixed,
};
use crate::error::{Result, SavError};

/// Character code for UTF-8 in the integer info record.
pub const CODEPAGE_UTF8: i32 = 65001;

/// A type 2 record as stored, before names and strings are decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    /// 0 numeric, >0 string width, -1 continuation slot.
    pub width: i32,
    /// Missing value code: 0..=3 discrete, -2 range, -3 range plus one.
    pub missing_code: i32,
    pub print_format: u32,
    pub write_format: u32,
    pub name: Vec<u8>,
    pub label: Option<Vec<u8>>,
    pub missing: Vec<[u8; 8]>,
}

impl RawVariable {
    /// Parse the body of a variable record (after its type code).
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let width = reader.i32()?;
        let has_label = reader.i32()?;
        let missing_code = reader.i32()?;
        let print_format = reader.u32()?;
        let write_format = reader.u32()?;
        let name = reader.take(8)?.to_vec();

        let label = if has_label == 1 {
            let len = reader.count()?;
            let label = reader.take(len)?.to_vec();
            reader.skip(len.next_multiple_of(4) - len)?;
            Some(label)
        } else {
            None
        };

        let n_missing = match missing_code {
            0..=3 => missing_code as usize,
            -2 => 2,
            -3 => 3,
            other => {
                return Err(SavError::invalid_format(format!(
                    "invalid missing value code {other}"
                )));
            }
        };
        let mut missing = Vec::with_capacity(n_missing);
        for _ in 0..n_missing {
            let mut value = [0u8; 8];
            value.copy_from_slice(reader.take(8)?);
            missing.push(value);
        }

        Ok(Self {
            width,
            missing_code,
            print_format,
            write_format,
            name,
            label,
            missing,
        })
    }

    pub fn is_continuation(&self) -> bool {
        self.width == -1
    }
}

/// Build one variable record. `missing` holds raw 8-byte values.
pub fn build_variable_record(
    short_name: &str,
    width: i32,
    label: Option<&[u8]>,
    missing_code: i32,
    missing: &[[u8; 8]],
    format: u32,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    out.extend(REC_VARIABLE.to_le_bytes());
    out.extend(width.to_le_bytes());
    out.extend(i32::from(label.is_some()).to_le_bytes());
    out.extend(missing_code.to_le_bytes());
    out.extend(format.to_le_bytes());
    out.extend(format.to_le_bytes());
    out.extend(fixed(short_name.as_bytes(), 8, b' '));
    if let Some(label) = label {
        let label = &label[..label.len().min(255)];
        out.extend((label.len() as i32).to_le_bytes());
        out.extend(fixed(label, label.len().next_multiple_of(4), b' '));
    }
    for value in missing {
        out.extend(value);
    }
    out
}

/// Build a type 3 record and its type 4 companion.
///
/// `labels` pairs raw 8-byte values with encoded label text; `indices` are
/// 1-based slot indices of the variables sharing the set.
pub fn build_value_label_records(labels: &[([u8; 8], Vec<u8>)], indices: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(REC_VALUE_LABELS.to_le_bytes());
    out.extend((labels.len() as i32).to_le_bytes());
    for (value, label) in labels {
        let label = &label[..label.len().min(255)];
        out.extend(value);
        out.push(label.len() as u8);
        out.extend(label);
        let used = 1 + label.len();
        out.extend(std::iter::repeat_n(b' ', used.next_multiple_of(8) - used));
    }
    out.extend(REC_VALUE_LABEL_VARS.to_le_bytes());
    out.extend((indices.len() as i32).to_le_bytes());
    for index in indices {
        out.extend(index.to_le_bytes());
    }
    out
}

/// Parse a type 3 record body: returns raw values and label bytes.
pub fn parse_value_labels(reader: &mut ByteReader<'_>) -> Result<Vec<([u8; 8], Vec<u8>)>> {
    let count = reader.count()?;
    let mut labels = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let mut value = [0u8; 8];
        value.copy_from_slice(reader.take(8)?);
        let len = usize::from(reader.u8()?);
        let label = reader.take(len)?.to_vec();
        let used = 1 + len;
        reader.skip(used.next_multiple_of(8) - used)?;
        labels.push((value, label));
    }
    Ok(labels)
}

/// Parse a type 4 record body: 1-based slot indices.
pub fn parse_value_label_vars(reader: &mut ByteReader<'_>) -> Result<Vec<usize>> {
    let count = reader.count()?;
    let mut indices = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        indices.push(reader.count()?);
    }
    Ok(indices)
}

/// A type 7 record with its payload.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionRecord<'a> {
    pub subtype: i32,
    pub size: usize,
    pub count: usize,
    pub data: &'a [u8],
}

impl<'a> ExtensionRecord<'a> {
    /// Parse the body of an extension record (after its type code).
    pub fn parse(reader: &mut ByteReader<'a>) -> Result<Self> {
        let subtype = reader.i32()?;
        let size = reader.count()?;
        let count = reader.count()?;
        let len = size
            .checked_mul(count)
            .ok_or_else(|| SavError::invalid_format("extension record too large"))?;
        let data = reader.take(len)?;
        Ok(Self {
            subtype,
            size,
            count,
            data,
        })
    }
}

fn extension(subtype: i32, size: usize, count: usize, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + data.len());
    out.extend(REC_EXTENSION.to_le_bytes());
    out.extend(subtype.to_le_bytes());
    out.extend((size as i32).to_le_bytes());
    out.extend((count as i32).to_le_bytes());
    out.extend(data);
    out
}

fn text_extension(subtype: i32, text: &[u8]) -> Vec<u8> {
    extension(subtype, 1, text.len(), text)
}

/// Machine integer info (subtype 3), declaring UTF-8 little-endian data.
pub fn build_integer_info(compression: i32) -> Vec<u8> {
    let fields: [i32; 8] = [1, 0, 0, -1, 1, compression, 2, CODEPAGE_UTF8];
    let data: Vec<u8> = fields.iter().flat_map(|v| v.to_le_bytes()).collect();
    extension(EXT_INTEGER_INFO, 4, fields.len(), &data)
}

/// Machine floating-point info (subtype 4).
pub fn build_float_info() -> Vec<u8> {
    let fields = [SYSMIS, f64::MAX, SYSMIS.next_up()];
    let data: Vec<u8> = fields.iter().flat_map(|v| v.to_le_bytes()).collect();
    extension(EXT_FLOAT_INFO, 8, fields.len(), &data)
}

/// Character code declared by an integer info record, if present.
pub fn parse_character_code(ext: &ExtensionRecord<'_>, reader: &ByteReader<'_>) -> Option<i32> {
    if ext.size != 4 || ext.count < 8 {
        return None;
    }
    let mut sub = ByteReader::new(ext.data, reader.endian());
    sub.skip(28).ok()?;
    sub.i32().ok()
}

/// Display parameters for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayParam {
    pub measure: u32,
    pub width: u32,
    pub alignment: u32,
}

/// Variable display parameters (subtype 11), one triple per segment.
pub fn build_display_params(params: &[DisplayParam]) -> Vec<u8> {
    let data: Vec<u8> = params
        .iter()
        .flat_map(|p| [p.measure, p.width, p.alignment])
        .flat_map(u32::to_le_bytes)
        .collect();
    extension(EXT_DISPLAY, 4, params.len() * 3, &data)
}

/// Parse subtype 11 for `n_segments` segments. Older writers omit the
/// width, giving pairs instead of triples. Returns `None` if the count
/// matches neither layout.
pub fn parse_display_params(
    ext: &ExtensionRecord<'_>,
    reader: &ByteReader<'_>,
    n_segments: usize,
) -> Result<Option<Vec<DisplayParam>>> {
    let per = if ext.count == n_segments * 3 {
        3
    } else if ext.count == n_segments * 2 {
        2
    } else {
        return Ok(None);
    };
    let mut sub = ByteReader::new(ext.data, reader.endian());
    let mut params = Vec::with_capacity(n_segments);
    for _ in 0..n_segments {
        let measure = sub.u32()?;
        let width = if per == 3 { sub.u32()? } else { 0 };
        let alignment = sub.u32()?;
        params.push(DisplayParam {
            measure,
            width,
            alignment,
        });
    }
    Ok(Some(params))
}

/// Long variable names (subtype 13): `SHORT=Long` pairs joined by tabs.
pub fn build_long_names(pairs: &[(String, String)]) -> Vec<u8> {
    let text = pairs
        .iter()
        .map(|(short, long)| format!("{short}={long}"))
        .collect::<Vec<_>>()
        .join("\t");
    text_extension(EXT_LONG_NAMES, text.as_bytes())
}

pub fn parse_long_names(text: &str) -> Vec<(String, String)> {
    text.split('\t')
        .filter_map(|pair| pair.split_once('='))
        .map(|(short, long)| (short.trim().to_string(), long.trim_end_matches('\0').to_string()))
        .collect()
}

/// Very long string widths (subtype 14): `SHORT=00300\0` entries joined by tabs.
pub fn build_very_long_strings(entries: &[(String, usize)]) -> Vec<u8> {
    let text: String = entries
        .iter()
        .map(|(short, width)| format!("{short}={width:05}\0\t"))
        .collect();
    text_extension(EXT_VERY_LONG_STRINGS, text.as_bytes())
}

pub fn parse_very_long_strings(text: &str) -> Vec<(String, usize)> {
    text.split('\t')
        .filter_map(|entry| entry.trim_matches('\0').split_once('='))
        .filter_map(|(short, width)| {
            width
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .parse()
                .ok()
                .map(|width| (short.trim().to_string(), width))
        })
        .collect()
}

/// Character encoding name (subtype 20).
pub fn build_encoding_record(name: &str) -> Vec<u8> {
    text_extension(EXT_ENCODING, name.as_bytes())
}

/// Value labels of one string variable wider than 8 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct LongStringLabels {
    pub name: Vec<u8>,
    pub width: u32,
    pub labels: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Long string value labels (subtype 21).
pub fn build_long_string_labels(sets: &[LongStringLabels]) -> Vec<u8> {
    let mut data = Vec::new();
    for set in sets {
        data.extend((set.name.len() as u32).to_le_bytes());
        data.extend(&set.name);
        data.extend(set.width.to_le_bytes());
        data.extend((set.labels.len() as u32).to_le_bytes());
        for (value, label) in &set.labels {
            data.extend((value.len() as u32).to_le_bytes());
            data.extend(value);
            data.extend((label.len() as u32).to_le_bytes());
            data.extend(label);
        }
    }
    extension(EXT_LONG_STRING_LABELS, 1, data.len(), &data)
}

pub fn parse_long_string_labels(
    ext: &ExtensionRecord<'_>,
    reader: &ByteReader<'_>,
) -> Result<Vec<LongStringLabels>> {
    let mut sub = ByteReader::new(ext.data, reader.endian());
    let mut sets = Vec::new();
    while !sub.is_at_end() {
        let len = sub.u32()? as usize;
        let name = sub.take(len)?.to_vec();
        let width = sub.u32()?;
        let n_labels = sub.u32()? as usize;
        let mut labels = Vec::with_capacity(n_labels.min(4096));
        for _ in 0..n_labels {
            let len = sub.u32()? as usize;
            let value = sub.take(len)?.to_vec();
            let len = sub.u32()? as usize;
            let label = sub.take(len)?.to_vec();
            labels.push((value, label));
        }
        sets.push(LongStringLabels {
            name,
            width,
            labels,
        });
    }
    Ok(sets)
}
