//! `.sav` file writer.
//!
//! Output is little-endian, UTF-8 encoded, and bytecode-compressed unless
//! the options say otherwise.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::compression::Compressor;
use crate::error::{Result, SavError};
use crate::header::file::{BIAS, FileHeader, SYSMIS};
use crate::header::records::{
    DisplayParam, LongStringLabels, build_display_params, build_encoding_record,
    build_float_info, build_integer_info, build_long_names, build_long_string_labels,
    build_value_label_records, build_variable_record, build_very_long_strings,
};
use crate::header::{REC_END, fixed, truncate_str};
use crate::types::{
    Compression, LabelValue, MissingValues, SavDataset, SavValue, SavVariable, SavWriterOptions,
    VarWidth,
};

/// Longest variable name a system file can store.
pub const MAX_NAME_LEN: usize = 64;

/// `.sav` file writer.
pub struct SavWriter<W: Write> {
    writer: BufWriter<W>,
    options: SavWriterOptions,
}

impl<W: Write> SavWriter<W> {
    /// Create a new writer with default options.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: SavWriterOptions::default(),
        }
    }

    /// Create a new writer with options.
    pub fn with_options(writer: W, options: SavWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(mut self, dataset: &SavDataset) -> Result<()> {
        validate_dataset(dataset)?;
        let layout = Layout::new(&dataset.variables);
        let created = self
            .options
            .created
            .unwrap_or_else(|| Local::now().naive_local());
        let compression = self.options.compression;

        let file_label = dataset
            .file_label
            .as_deref()
            .map(|label| truncate_str(label, 64))
            .unwrap_or_default();
        let header = FileHeader::new(
            truncate_str(&self.options.product, 40),
            layout.n_slots,
            compression.code(),
            dataset.rows.len(),
            created,
            file_label,
        );
        self.writer.write_all(&header.build())?;

        self.write_variable_records(dataset, &layout)?;
        self.write_value_labels(dataset, &layout)?;

        self.writer
            .write_all(&build_integer_info(compression.code()))?;
        self.writer.write_all(&build_float_info())?;
        self.writer
            .write_all(&build_display_params(&display_params(dataset)))?;
        let long_names: Vec<(String, String)> = dataset
            .variables
            .iter()
            .zip(&layout.short_names)
            .map(|(var, names)| (names[0].clone(), var.name.clone()))
            .collect();
        self.writer.write_all(&build_long_names(&long_names))?;

        let very_long: Vec<(String, usize)> = dataset
            .variables
            .iter()
            .zip(&layout.short_names)
            .filter_map(|(var, names)| match var.width {
                VarWidth::String(w) if var.width.is_very_long_string() => {
                    Some((names[0].clone(), usize::from(w)))
                }
                _ => None,
            })
            .collect();
        if !very_long.is_empty() {
            self.writer
                .write_all(&build_very_long_strings(&very_long))?;
        }
        self.writer.write_all(&build_encoding_record("UTF-8"))?;

        let long_labels = long_string_labels(dataset);
        if !long_labels.is_empty() {
            self.writer
                .write_all(&build_long_string_labels(&long_labels))?;
        }

        self.writer.write_all(&REC_END.to_le_bytes())?;
        self.writer.write_all(&0i32.to_le_bytes())?;

        match compression {
            Compression::None => self.write_cases_uncompressed(dataset)?,
            Compression::Bytecode => self.write_cases_compressed(dataset)?,
        }

        self.writer.flush()?;
        Ok(())
    }

    fn write_variable_records(&mut self, dataset: &SavDataset, layout: &Layout) -> Result<()> {
        for (var, short_names) in dataset.variables.iter().zip(&layout.short_names) {
            let segments = var.width.segment_widths();
            let (missing_code, missing) = encode_missing(var);

            for (idx, (seg_width, short)) in segments.iter().zip(short_names).enumerate() {
                let format = if idx == 0 && var.is_numeric() {
                    var.format.to_raw()
                } else {
                    crate::types::SavFormat::string(*seg_width as u8).to_raw()
                };
                let (label, code, values) = if idx == 0 {
                    (
                        var.label.as_deref().map(str::as_bytes),
                        missing_code,
                        missing.as_slice(),
                    )
                } else {
                    (None, 0, &[][..])
                };
                self.writer.write_all(&build_variable_record(
                    short,
                    *seg_width as i32,
                    label,
                    code,
                    values,
                    format,
                ))?;
                for _ in 1..crate::types::chunks_for(*seg_width) {
                    self.writer
                        .write_all(&build_variable_record("", -1, None, 0, &[], 0))?;
                }
            }
        }
        Ok(())
    }

    fn write_value_labels(&mut self, dataset: &SavDataset, layout: &Layout) -> Result<()> {
        for (var, slot) in dataset.variables.iter().zip(&layout.first_slots) {
            if var.value_labels.is_empty() || var.width.is_long_string() {
                continue;
            }
            let labels: Vec<([u8; 8], Vec<u8>)> = var
                .value_labels
                .iter()
                .filter_map(|vl| {
                    let value = match (&vl.value, var.width) {
                        (LabelValue::Number(n), VarWidth::Numeric) => n.to_le_bytes(),
                        (LabelValue::Text(t), VarWidth::String(_)) => pad8(t.as_bytes()),
                        _ => return None,
                    };
                    Some((value, vl.label.as_bytes().to_vec()))
                })
                .collect();
            if labels.is_empty() {
                continue;
            }
            self.writer
                .write_all(&build_value_label_records(&labels, &[*slot as u32]))?;
        }
        Ok(())
    }

    fn write_cases_uncompressed(&mut self, dataset: &SavDataset) -> Result<()> {
        for row in &dataset.rows {
            for (value, var) in row.iter().zip(&dataset.variables) {
                match value {
                    SavValue::Number(n) => {
                        self.writer
                            .write_all(&n.unwrap_or(SYSMIS).to_le_bytes())?;
                    }
                    SavValue::Text(text) => {
                        for chunk in string_slots(text.as_bytes(), var.width) {
                            self.writer.write_all(&chunk)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn write_cases_compressed(&mut self, dataset: &SavDataset) -> Result<()> {
        let mut compressor = Compressor::new(&mut self.writer, BIAS);
        for row in &dataset.rows {
            for (value, var) in row.iter().zip(&dataset.variables) {
                match value {
                    SavValue::Number(n) => compressor.put_number(*n)?,
                    SavValue::Text(text) => {
                        for chunk in string_slots(text.as_bytes(), var.width) {
                            compressor.put_string_chunk(&chunk)?;
                        }
                    }
                }
            }
        }
        compressor.finish()?;
        Ok(())
    }
}

impl SavWriter<File> {
    /// Create a `.sav` file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a `.sav` file with options.
    pub fn create_with_options(path: &Path, options: SavWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to a `.sav` file.
///
/// The dataset is encoded in memory first and the file is replaced only on
/// success, so a rejected dataset leaves nothing on disk.
pub fn write_sav(path: &Path, dataset: &SavDataset) -> Result<()> {
    write_sav_with_options(path, dataset, SavWriterOptions::default())
}

/// Write a dataset to a `.sav` file with options.
pub fn write_sav_with_options(
    path: &Path,
    dataset: &SavDataset,
    options: SavWriterOptions,
) -> Result<()> {
    let mut bytes = Vec::new();
    SavWriter::with_options(&mut bytes, options).write_dataset(dataset)?;
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

/// Check names, row shapes and value types before anything is written.
pub fn validate_dataset(dataset: &SavDataset) -> Result<()> {
    let mut seen = HashSet::new();
    for var in &dataset.variables {
        validate_name(&var.name)?;
        if !seen.insert(var.name.to_uppercase()) {
            return Err(SavError::DuplicateVariable {
                name: var.name.clone(),
            });
        }
        if let VarWidth::String(w) = var.width
            && (w == 0 || w > VarWidth::MAX_STRING)
        {
            return Err(SavError::WidthTooLarge {
                name: var.name.clone(),
                width: usize::from(w),
                max: usize::from(VarWidth::MAX_STRING),
            });
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.variables.len() {
            return Err(SavError::RowLengthMismatch {
                expected: dataset.variables.len(),
                actual: row.len(),
            });
        }
        for (value, var) in row.iter().zip(&dataset.variables) {
            match (value, var.width) {
                (SavValue::Number(_), VarWidth::Numeric) => {}
                (SavValue::Text(text), VarWidth::String(w)) => {
                    if text.len() > usize::from(w) {
                        return Err(SavError::WidthTooLarge {
                            name: var.name.clone(),
                            width: text.len(),
                            max: usize::from(w),
                        });
                    }
                }
                (_, VarWidth::Numeric) => {
                    return Err(SavError::TypeMismatch {
                        name: var.name.clone(),
                        expected: "numeric",
                    });
                }
                (_, VarWidth::String(_)) => {
                    return Err(SavError::TypeMismatch {
                        name: var.name.clone(),
                        expected: "string",
                    });
                }
            }
        }
    }
    Ok(())
}

/// Words that cannot be used as variable names.
const RESERVED_WORDS: [&str; 13] = [
    "ALL", "AND", "BY", "EQ", "GE", "GT", "LE", "LT", "NE", "NOT", "OR", "TO", "WITH",
];

/// SPSS identifiers: a letter, `@`, `#` or `$` first, then letters, digits,
/// `.`, `_`, `@`, `#` or `$`, at most 64 bytes, and not a reserved word.
fn validate_name(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(SavError::invalid_variable_name(name, "name is empty"));
    };
    if name.len() > MAX_NAME_LEN {
        return Err(SavError::invalid_variable_name(
            name,
            "name is longer than 64 bytes",
        ));
    }
    if !(first.is_alphabetic() || matches!(first, '@' | '#' | '$')) {
        return Err(SavError::invalid_variable_name(
            name,
            "name must start with a letter, '@', '#' or '$'",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '@' | '#' | '$'))
    {
        return Err(SavError::invalid_variable_name(
            name,
            "name may contain only letters, digits, '.', '_', '@', '#' and '$'",
        ));
    }
    if RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
    {
        return Err(SavError::invalid_variable_name(name, "name is a reserved word"));
    }
    Ok(())
}

/// Slot positions and short names for every variable.
struct Layout {
    /// Short names, one per segment.
    short_names: Vec<Vec<String>>,
    /// 1-based slot index of each variable's first segment.
    first_slots: Vec<usize>,
    n_slots: usize,
}

impl Layout {
    fn new(variables: &[SavVariable]) -> Self {
        let short_names = short_names(variables);
        let mut first_slots = Vec::with_capacity(variables.len());
        let mut next = 1usize;
        for var in variables {
            first_slots.push(next);
            next += var.width.n_chunks();
        }
        Self {
            short_names,
            first_slots,
            n_slots: next - 1,
        }
    }
}

/// Generate unique 8-byte uppercase short names for every segment.
pub fn short_names(variables: &[SavVariable]) -> Vec<Vec<String>> {
    let mut used = HashSet::new();
    let mut counter = 0usize;
    let mut claim = |candidate: String| -> String {
        if used.insert(candidate.clone()) {
            return candidate;
        }
        loop {
            counter += 1;
            let suffix = format!("_{counter}");
            let stem = truncate_str(&candidate, 8 - suffix.len()).to_string();
            let name = format!("{stem}{suffix}");
            if used.insert(name.clone()) {
                return name;
            }
        }
    };

    variables
        .iter()
        .map(|var| {
            let base = short_base(&var.name);
            let n_segments = var.width.segment_widths().len();
            let mut names = vec![claim(base.clone())];
            for idx in 1..n_segments {
                let suffix = idx.to_string();
                let stem = truncate_str(&base, 8 - suffix.len()).to_string();
                names.push(claim(format!("{stem}{suffix}")));
            }
            names
        })
        .collect()
}

fn short_base(name: &str) -> String {
    let mut base: String = name
        .chars()
        .filter_map(|c| {
            let c = c.to_ascii_uppercase();
            (c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '#' | '$')).then_some(c)
        })
        .take(8)
        .collect();
    if !base.starts_with(|c: char| c.is_ascii_alphabetic() || c == '@') {
        base.insert(0, 'V');
        base.truncate(8);
    }
    base
}

fn pad8(bytes: &[u8]) -> [u8; 8] {
    let mut out = [b' '; 8];
    let len = bytes.len().min(8);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

fn encode_missing(var: &SavVariable) -> (i32, Vec<[u8; 8]>) {
    if var.width.is_long_string() {
        return (0, Vec::new());
    }
    match &var.missing {
        MissingValues::None => (0, Vec::new()),
        MissingValues::Discrete(values) => {
            let encoded: Vec<[u8; 8]> = values
                .iter()
                .take(3)
                .filter_map(|value| match (value, var.width) {
                    (LabelValue::Number(n), VarWidth::Numeric) => Some(n.to_le_bytes()),
                    (LabelValue::Text(t), VarWidth::String(_)) => Some(pad8(t.as_bytes())),
                    _ => None,
                })
                .collect();
            (encoded.len() as i32, encoded)
        }
        MissingValues::Range { low, high } if var.is_numeric() => {
            (-2, vec![low.to_le_bytes(), high.to_le_bytes()])
        }
        MissingValues::RangeAndValue { low, high, value } if var.is_numeric() => (
            -3,
            vec![low.to_le_bytes(), high.to_le_bytes(), value.to_le_bytes()],
        ),
        _ => (0, Vec::new()),
    }
}

fn display_params(dataset: &SavDataset) -> Vec<DisplayParam> {
    let mut params = Vec::new();
    for var in &dataset.variables {
        let alignment = if var.is_numeric() { 1 } else { 0 };
        for (idx, width) in var.width.segment_widths().into_iter().enumerate() {
            let display_width = match (idx, var.width) {
                (0, VarWidth::Numeric) => 8,
                (0, VarWidth::String(w)) => u32::from(w.min(32)),
                _ => width.min(32) as u32,
            };
            params.push(DisplayParam {
                measure: var.measure.code(),
                width: display_width,
                alignment,
            });
        }
    }
    params
}

fn long_string_labels(dataset: &SavDataset) -> Vec<LongStringLabels> {
    dataset
        .variables
        .iter()
        .filter(|var| var.width.is_long_string() && !var.value_labels.is_empty())
        .filter_map(|var| {
            let width = var.width.string_width()?;
            let labels: Vec<(Vec<u8>, Vec<u8>)> = var
                .value_labels
                .iter()
                .filter_map(|vl| match &vl.value {
                    LabelValue::Text(text) => Some((
                        fixed(text.as_bytes(), width, b' '),
                        vl.label.as_bytes().to_vec(),
                    )),
                    LabelValue::Number(_) => None,
                })
                .collect();
            (!labels.is_empty()).then(|| LongStringLabels {
                name: var.name.as_bytes().to_vec(),
                width: width as u32,
                labels,
            })
        })
        .collect()
}

/// Split a string value into space-padded 8-byte slots across segments.
///
/// Each segment carries at most 255 bytes of data; the rest of its
/// allocation is padding.
fn string_slots(mut bytes: &[u8], width: VarWidth) -> Vec<[u8; 8]> {
    let mut slots = Vec::with_capacity(width.n_chunks());
    for seg_width in width.segment_widths() {
        let alloc = seg_width.next_multiple_of(8);
        let take = bytes.len().min(alloc).min(255);
        let mut segment = bytes[..take].to_vec();
        bytes = &bytes[take..];
        segment.resize(alloc, b' ');
        for chunk in segment.chunks_exact(8) {
            let mut slot = [0u8; 8];
            slot.copy_from_slice(chunk);
            slots.push(slot);
        }
    }
    slots
}
