//! `.dta` file writer. Always emits release 118, little-endian.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{DtaError, Result};
use crate::missing::encode_number;
use crate::release::{Release, WRITE_RELEASE};
use crate::types::{DtaDataset, DtaType, DtaValue, DtaWriterOptions, LabelSet};

/// Longest variable or label-set name, in characters.
pub const MAX_NAME_CHARS: usize = 32;
/// Longest dataset or variable label, in characters.
pub const MAX_LABEL_CHARS: usize = 80;

/// `.dta` file writer.
pub struct DtaWriter<W: Write> {
    writer: BufWriter<W>,
    options: DtaWriterOptions,
}

impl<W: Write> DtaWriter<W> {
    /// Create a new writer with default options.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: DtaWriterOptions::default(),
        }
    }

    /// Create a new writer with options.
    pub fn with_options(writer: W, options: DtaWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(mut self, dataset: &DtaDataset) -> Result<()> {
        validate_dataset(dataset)?;
        let bytes = build_file(dataset, &self.options)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl DtaWriter<File> {
    /// Create a `.dta` file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a `.dta` file with options.
    pub fn create_with_options(path: &Path, options: DtaWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to a `.dta` file.
///
/// The file is only created once the dataset has been validated and
/// encoded, so a rejected dataset leaves nothing on disk.
pub fn write_dta(path: &Path, dataset: &DtaDataset) -> Result<()> {
    write_dta_with_options(path, dataset, DtaWriterOptions::default())
}

/// Write a dataset to a `.dta` file with options.
pub fn write_dta_with_options(
    path: &Path,
    dataset: &DtaDataset,
    options: DtaWriterOptions,
) -> Result<()> {
    validate_dataset(dataset)?;
    let bytes = build_file(dataset, &options)?;
    write_replacing(path, &bytes)
}

/// Write to a sibling temp file, then rename over `path`.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

/// Check names, shapes and value types before anything is written.
pub fn validate_dataset(dataset: &DtaDataset) -> Result<()> {
    let mut seen = HashSet::new();
    for var in &dataset.variables {
        validate_name(&var.name)?;
        if !seen.insert(var.name.as_str()) {
            return Err(DtaError::DuplicateVariable {
                name: var.name.clone(),
            });
        }
    }
    for set in &dataset.label_sets {
        validate_name(&set.name)?;
    }

    for row in &dataset.rows {
        if row.len() != dataset.variables.len() {
            return Err(DtaError::RowLengthMismatch {
                expected: dataset.variables.len(),
                actual: row.len(),
            });
        }
        for (value, var) in row.iter().zip(&dataset.variables) {
            let ok = match (value, var.dtype) {
                (DtaValue::Text(text), DtaType::Str(width)) => text.len() <= usize::from(width),
                (DtaValue::Text(_), DtaType::StrL) => true,
                (DtaValue::Number(n), dtype) if dtype.is_numeric() => {
                    encode_number(dtype, *n).is_some()
                }
                _ => false,
            };
            if !ok {
                return Err(DtaError::TypeMismatch {
                    name: var.name.clone(),
                    expected: if var.dtype.is_numeric() {
                        "in-range numeric"
                    } else {
                        "fitting string"
                    },
                });
            }
        }
    }
    Ok(())
}

/// Stata names: 1 to 32 characters, letters, digits and `_`, not starting
/// with a digit.
fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(DtaError::InvalidVariableName {
            name: name.to_string(),
            reason,
        })
    };
    let Some(first) = name.chars().next() else {
        return invalid("name is empty");
    };
    if name.chars().count() > MAX_NAME_CHARS {
        return invalid("name is longer than 32 characters");
    }
    if first.is_ascii_digit() {
        return invalid("name starts with a digit");
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return invalid("name may contain only letters, digits and '_'");
    }
    Ok(())
}

/// Truncate to at most `chars` characters and `bytes` bytes.
fn clip(text: &str, chars: usize, bytes: usize) -> &[u8] {
    let mut end = 0;
    for (count, (idx, c)) in text.char_indices().enumerate() {
        if count >= chars || idx + c.len_utf8() > bytes {
            break;
        }
        end = idx + c.len_utf8();
    }
    &text.as_bytes()[..end]
}

/// NUL-padded fixed-width field.
fn fixed(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(width - 1)].to_vec();
    out.resize(width, 0);
    out
}

fn build_file(dataset: &DtaDataset, options: &DtaWriterOptions) -> Result<Vec<u8>> {
    let release = Release::new(WRITE_RELEASE)?;
    let k = dataset.variables.len();
    let mut out = Vec::new();
    let mut map = [0u64; 14];

    out.extend_from_slice(b"<stata_dta>");
    out.extend_from_slice(b"<header>");
    out.extend_from_slice(format!("<release>{WRITE_RELEASE}</release>").as_bytes());
    out.extend_from_slice(b"<byteorder>LSF</byteorder>");
    let k_field = u16::try_from(k)
        .map_err(|_| DtaError::invalid_format("too many variables for release 118"))?;
    out.extend_from_slice(b"<K>");
    out.extend_from_slice(&k_field.to_le_bytes());
    out.extend_from_slice(b"</K><N>");
    out.extend_from_slice(&(dataset.rows.len() as u64).to_le_bytes());
    out.extend_from_slice(b"</N><label>");
    let label = clip(
        dataset.label.as_deref().unwrap_or_default(),
        MAX_LABEL_CHARS,
        320,
    );
    out.extend_from_slice(&(label.len() as u16).to_le_bytes());
    out.extend_from_slice(label);
    out.extend_from_slice(b"</label><timestamp>");
    let created = options
        .created
        .unwrap_or_else(|| Local::now().naive_local());
    let stamp = created.format("%d %b %Y %H:%M").to_string();
    out.push(stamp.len() as u8);
    out.extend_from_slice(stamp.as_bytes());
    out.extend_from_slice(b"</timestamp></header>");

    map[1] = out.len() as u64;
    out.extend_from_slice(b"<map>");
    let map_start = out.len();
    out.extend_from_slice(&[0u8; 14 * 8]);
    out.extend_from_slice(b"</map>");

    map[2] = out.len() as u64;
    out.extend_from_slice(b"<variable_types>");
    for var in &dataset.variables {
        out.extend_from_slice(&var.dtype.code().to_le_bytes());
    }
    out.extend_from_slice(b"</variable_types>");

    map[3] = out.len() as u64;
    out.extend_from_slice(b"<varnames>");
    for var in &dataset.variables {
        out.extend(fixed(var.name.as_bytes(), release.name_len()));
    }
    out.extend_from_slice(b"</varnames>");

    map[4] = out.len() as u64;
    out.extend_from_slice(b"<sortlist>");
    out.extend(std::iter::repeat_n(0u8, (k + 1) * release.sortlist_width()));
    out.extend_from_slice(b"</sortlist>");

    map[5] = out.len() as u64;
    out.extend_from_slice(b"<formats>");
    for var in &dataset.variables {
        out.extend(fixed(var.format.as_bytes(), release.format_len()));
    }
    out.extend_from_slice(b"</formats>");

    map[6] = out.len() as u64;
    out.extend_from_slice(b"<value_label_names>");
    for var in &dataset.variables {
        let name = var
            .value_label
            .as_deref()
            .filter(|name| dataset.label_set(name).is_some())
            .unwrap_or_default();
        out.extend(fixed(name.as_bytes(), release.name_len()));
    }
    out.extend_from_slice(b"</value_label_names>");

    map[7] = out.len() as u64;
    out.extend_from_slice(b"<variable_labels>");
    for var in &dataset.variables {
        let label = clip(var.label.as_deref().unwrap_or_default(), MAX_LABEL_CHARS, 320);
        out.extend(fixed(label, release.variable_label_len()));
    }
    out.extend_from_slice(b"</variable_labels>");

    map[8] = out.len() as u64;
    out.extend_from_slice(b"<characteristics></characteristics>");

    map[9] = out.len() as u64;
    out.extend_from_slice(b"<data>");
    let mut strls = Vec::new();
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        for (var_idx, (value, var)) in row.iter().zip(&dataset.variables).enumerate() {
            match (value, var.dtype) {
                (DtaValue::Text(text), DtaType::Str(width)) => {
                    let mut field = text.as_bytes().to_vec();
                    field.resize(usize::from(width), 0);
                    out.extend(field);
                }
                (DtaValue::Text(text), DtaType::StrL) => {
                    if text.is_empty() {
                        out.extend_from_slice(&[0u8; 8]);
                    } else {
                        let v = (var_idx + 1) as u64;
                        let o = (row_idx + 1) as u64;
                        out.extend(strl_ref(v, o, release));
                        strls.push((v, o, text.as_str()));
                    }
                }
                (DtaValue::Number(n), dtype) => {
                    let bytes = encode_number(dtype, *n).ok_or_else(|| DtaError::TypeMismatch {
                        name: var.name.clone(),
                        expected: "numeric",
                    })?;
                    out.extend(bytes);
                }
                _ => {
                    return Err(DtaError::TypeMismatch {
                        name: var.name.clone(),
                        expected: "string",
                    });
                }
            }
        }
    }
    out.extend_from_slice(b"</data>");

    map[10] = out.len() as u64;
    out.extend_from_slice(b"<strls>");
    for (v, o, text) in strls {
        out.extend_from_slice(b"GSO");
        out.extend_from_slice(&(v as u32).to_le_bytes());
        out.extend_from_slice(&o.to_le_bytes());
        out.push(130);
        out.extend_from_slice(&(text.len() as u32 + 1).to_le_bytes());
        out.extend_from_slice(text.as_bytes());
        out.push(0);
    }
    out.extend_from_slice(b"</strls>");

    map[11] = out.len() as u64;
    out.extend_from_slice(b"<value_labels>");
    for set in &dataset.label_sets {
        out.extend(build_label_set(set, release));
    }
    out.extend_from_slice(b"</value_labels>");

    map[12] = out.len() as u64;
    out.extend_from_slice(b"</stata_dta>");
    map[13] = out.len() as u64;

    for (idx, offset) in map.iter().enumerate() {
        let at = map_start + idx * 8;
        out[at..at + 8].copy_from_slice(&offset.to_le_bytes());
    }
    Ok(out)
}

/// 8-byte strL reference: variable number then observation number.
fn strl_ref(v: u64, o: u64, release: Release) -> Vec<u8> {
    let v_width = release.strl_v_width();
    let mut bytes = v.to_le_bytes()[..v_width].to_vec();
    bytes.extend_from_slice(&o.to_le_bytes()[..8 - v_width]);
    bytes
}

fn build_label_set(set: &LabelSet, release: Release) -> Vec<u8> {
    let mut offsets = Vec::with_capacity(set.entries.len());
    let mut text = Vec::new();
    for (_, label) in &set.entries {
        offsets.push(text.len() as u32);
        text.extend_from_slice(clip(label, usize::MAX, 32000));
        text.push(0);
    }
    let n = set.entries.len();
    let len = 8 + 8 * n + text.len();

    let mut out = Vec::with_capacity(len + 150);
    out.extend_from_slice(b"<lbl>");
    out.extend_from_slice(&(len as u32).to_le_bytes());
    out.extend(fixed(set.name.as_bytes(), release.name_len()));
    out.extend_from_slice(&[0u8; 3]);
    out.extend_from_slice(&(n as u32).to_le_bytes());
    out.extend_from_slice(&(text.len() as u32).to_le_bytes());
    for offset in offsets {
        out.extend_from_slice(&offset.to_le_bytes());
    }
    for (value, _) in &set.entries {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend(text);
    out.extend_from_slice(b"</lbl>");
    out
}
