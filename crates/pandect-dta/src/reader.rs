//! `.dta` file reader for releases 117, 118 and 119.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;

use crate::cursor::{Cursor, uint_from};
use crate::error::{DtaError, Result};
use crate::missing::decode_number;
use crate::release::Release;
use crate::types::{DtaDataset, DtaType, DtaValue, DtaVariable, LabelSet};

/// Map entries used to locate sections.
const MAP_DATA: usize = 9;
const MAP_STRLS: usize = 10;
const MAP_VALUE_LABELS: usize = 11;

/// `.dta` file reader.
pub struct DtaReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> DtaReader<R> {
    /// Create a new reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the entire file into memory and decode it.
    pub fn read_dataset(mut self) -> Result<DtaDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_dta_data(&data)
    }
}

impl DtaReader<File> {
    /// Open a `.dta` file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DtaError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DtaError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read a `.dta` file from a path.
pub fn read_dta(path: &Path) -> Result<DtaDataset> {
    DtaReader::open(path)?.read_dataset()
}

/// Decode a complete `.dta` file held in memory.
pub fn parse_dta_data(data: &[u8]) -> Result<DtaDataset> {
    let mut cursor = Cursor::new(data);
    if !cursor.peek(b"<stata_dta>") {
        // Releases before 117 start with a binary release byte.
        return Err(match data.first() {
            Some(&release @ 102..=116) => DtaError::UnsupportedRelease {
                release: release.to_string(),
            },
            _ => DtaError::invalid_format("missing <stata_dta> signature"),
        });
    }
    cursor.open("stata_dta")?;

    cursor.open("header")?;
    cursor.open("release")?;
    let release_text = String::from_utf8_lossy(cursor.take(3)?).to_string();
    let release = release_text
        .parse::<u16>()
        .map_err(|_| DtaError::UnsupportedRelease {
            release: release_text.clone(),
        })
        .and_then(Release::new)?;
    cursor.close("release")?;

    cursor.open("byteorder")?;
    match cursor.take(3)? {
        b"LSF" => cursor.set_big_endian(false),
        b"MSF" => cursor.set_big_endian(true),
        other => {
            return Err(DtaError::invalid_format(format!(
                "unknown byte order {}",
                String::from_utf8_lossy(other)
            )));
        }
    }
    cursor.close("byteorder")?;

    cursor.open("K")?;
    let k = cursor.length(release.k_width())?;
    cursor.close("K")?;
    cursor.open("N")?;
    let n = cursor.length(release.n_width())?;
    cursor.close("N")?;

    let encoding = release.encoding();
    let decode = |bytes: &[u8]| decode_text(encoding, bytes);

    cursor.open("label")?;
    let label_len = cursor.length(release.label_len_width())?;
    let label = decode(cursor.take(label_len)?);
    cursor.close("label")?;

    cursor.open("timestamp")?;
    let ts_len = usize::from(cursor.u8()?);
    let timestamp = decode(cursor.take(ts_len)?);
    cursor.close("timestamp")?;
    cursor.close("header")?;

    cursor.open("map")?;
    let mut map = [0u64; 14];
    for entry in &mut map {
        *entry = cursor.u64()?;
    }
    cursor.close("map")?;

    cursor.open("variable_types")?;
    let mut types = Vec::with_capacity(k);
    for index in 0..k {
        let code = cursor.u16()?;
        types.push(DtaType::from_code(code).ok_or(DtaError::UnknownType { code, index })?);
    }
    cursor.close("variable_types")?;

    let names = read_fixed_section(&mut cursor, "varnames", k, release.name_len(), &decode)?;

    cursor.open("sortlist")?;
    cursor.take((k + 1) * release.sortlist_width())?;
    cursor.close("sortlist")?;

    let formats = read_fixed_section(&mut cursor, "formats", k, release.format_len(), &decode)?;
    let label_names = read_fixed_section(
        &mut cursor,
        "value_label_names",
        k,
        release.name_len(),
        &decode,
    )?;
    let var_labels = read_fixed_section(
        &mut cursor,
        "variable_labels",
        k,
        release.variable_label_len(),
        &decode,
    )?;

    let variables: Vec<DtaVariable> = types
        .iter()
        .zip(names)
        .zip(formats)
        .zip(label_names.into_iter().zip(var_labels))
        .map(|(((dtype, name), format), (value_label, label))| DtaVariable {
            name,
            dtype: *dtype,
            format,
            label: (!label.is_empty()).then_some(label),
            value_label: (!value_label.is_empty()).then_some(value_label),
        })
        .collect();

    let strls = read_strls(&mut cursor, map[MAP_STRLS], release, &decode)?;
    let rows = read_data(&mut cursor, map[MAP_DATA], n, &types, release, &strls, &decode)?;
    let label_sets = read_value_labels(&mut cursor, map[MAP_VALUE_LABELS], release, &decode)?;

    Ok(DtaDataset {
        release: release.number(),
        label: (!label.is_empty()).then_some(label),
        timestamp: (!timestamp.is_empty()).then_some(timestamp),
        variables,
        label_sets,
        rows,
    })
}

fn decode_text(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    encoding
        .decode_without_bom_handling(&bytes[..end])
        .0
        .into_owned()
}

fn read_fixed_section(
    cursor: &mut Cursor<'_>,
    tag: &'static str,
    count: usize,
    width: usize,
    decode: &dyn Fn(&[u8]) -> String,
) -> Result<Vec<String>> {
    cursor.open(tag)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(decode(cursor.take(width)?));
    }
    cursor.close(tag)?;
    Ok(values)
}

fn seek_section(cursor: &mut Cursor<'_>, offset: u64) -> Result<()> {
    let offset = usize::try_from(offset)
        .map_err(|_| DtaError::invalid_format("section offset too large"))?;
    cursor.seek(offset)
}

type StrlKey = (u64, u64);

fn read_strls(
    cursor: &mut Cursor<'_>,
    offset: u64,
    release: Release,
    decode: &dyn Fn(&[u8]) -> String,
) -> Result<HashMap<StrlKey, String>> {
    seek_section(cursor, offset)?;
    cursor.open("strls")?;
    let mut strls = HashMap::new();
    while cursor.peek(b"GSO") {
        cursor.take(3)?;
        let v = u64::from(cursor.u32()?);
        let o = cursor.uint(release.gso_o_width())?;
        let kind = cursor.u8()?;
        let len = cursor.length(4)?;
        let bytes = cursor.take(len)?;
        let text = match kind {
            // ASCII strings are stored with a trailing NUL.
            130 => decode(bytes),
            _ => String::from_utf8_lossy(bytes).into_owned(),
        };
        strls.insert((v, o), text);
    }
    cursor.close("strls")?;
    Ok(strls)
}

fn read_data(
    cursor: &mut Cursor<'_>,
    offset: u64,
    n: usize,
    types: &[DtaType],
    release: Release,
    strls: &HashMap<StrlKey, String>,
    decode: &dyn Fn(&[u8]) -> String,
) -> Result<Vec<Vec<DtaValue>>> {
    seek_section(cursor, offset)?;
    cursor.open("data")?;
    let big_endian = cursor.is_big_endian();
    let row_len: usize = types.iter().map(|t| t.width()).sum();
    let v_width = release.strl_v_width();

    let mut rows = Vec::with_capacity(n.min(1 << 20));
    for _ in 0..n {
        let row_bytes = cursor.take(row_len)?;
        let mut pos = 0;
        let mut row = Vec::with_capacity(types.len());
        for dtype in types {
            let bytes = &row_bytes[pos..pos + dtype.width()];
            pos += dtype.width();
            let value = match dtype {
                DtaType::Str(_) => DtaValue::Text(decode(bytes)),
                DtaType::StrL => {
                    let v = uint_from(&bytes[..v_width], big_endian);
                    let o = uint_from(&bytes[v_width..], big_endian);
                    DtaValue::Text(strls.get(&(v, o)).cloned().unwrap_or_default())
                }
                numeric => DtaValue::Number(decode_number(*numeric, bytes, big_endian)),
            };
            row.push(value);
        }
        rows.push(row);
    }
    cursor.close("data")?;
    Ok(rows)
}

fn read_value_labels(
    cursor: &mut Cursor<'_>,
    offset: u64,
    release: Release,
    decode: &dyn Fn(&[u8]) -> String,
) -> Result<Vec<LabelSet>> {
    seek_section(cursor, offset)?;
    cursor.open("value_labels")?;
    let big_endian = cursor.is_big_endian();
    let mut sets = Vec::new();
    while cursor.peek(b"<lbl>") {
        cursor.open("lbl")?;
        let _len = cursor.u32()?;
        let name = decode(cursor.take(release.name_len())?);
        cursor.take(3)?;
        let count = cursor.length(4)?;
        let txt_len = cursor.length(4)?;
        let mut offsets = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            offsets.push(cursor.length(4)?);
        }
        let mut values = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            values.push(uint_from(cursor.take(4)?, big_endian) as u32 as i32);
        }
        let text = cursor.take(txt_len)?;
        cursor.close("lbl")?;

        let entries = values
            .into_iter()
            .zip(offsets)
            .map(|(value, start)| {
                let label = text.get(start..).map(decode).unwrap_or_default();
                (value, label)
            })
            .collect();
        sets.push(LabelSet { name, entries });
    }
    cursor.close("value_labels")?;
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_release_is_unsupported() {
        let data = [114u8, 2, 1, 0];
        assert!(matches!(
            parse_dta_data(&data),
            Err(DtaError::UnsupportedRelease { .. })
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            parse_dta_data(b"hello world"),
            Err(DtaError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_release_120_is_unsupported() {
        let data = b"<stata_dta><header><release>120</release>";
        assert!(matches!(
            parse_dta_data(data),
            Err(DtaError::UnsupportedRelease { .. })
        ));
    }
}
