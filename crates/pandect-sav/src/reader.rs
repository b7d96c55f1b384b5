//! `.sav` file reader.
//!
//! The whole file is read into memory, the dictionary is decoded, and the
//! case data is expanded into rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::compression::decompress;
use crate::error::{Result, SavError};
use crate::header::bytes::ByteReader;
use crate::header::file::{FILE_HEADER_LEN, FileHeader, SYSMIS};
use crate::header::records::{
    CODEPAGE_UTF8, ExtensionRecord, RawVariable, parse_character_code, parse_display_params,
    parse_long_names, parse_long_string_labels, parse_value_label_vars, parse_value_labels,
    parse_very_long_strings,
};
use crate::header::{
    EXT_DISPLAY, EXT_ENCODING, EXT_INTEGER_INFO, EXT_LONG_NAMES, EXT_LONG_STRING_LABELS,
    EXT_VERY_LONG_STRINGS, REC_DOCUMENT, REC_END, REC_EXTENSION, REC_VALUE_LABEL_VARS,
    REC_VALUE_LABELS, REC_VARIABLE, trim_padding,
};
use crate::types::{
    LabelValue, Measure, MissingValues, SavDataset, SavFormat, SavReaderOptions, SavValue,
    SavVariable, ValueLabel, VarWidth,
};

/// `.sav` file reader.
pub struct SavReader<R: Read> {
    reader: BufReader<R>,
    options: SavReaderOptions,
}

impl<R: Read> SavReader<R> {
    /// Create a new reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: SavReaderOptions::default(),
        }
    }

    /// Create a new reader with options.
    pub fn with_options(reader: R, options: SavReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire file into memory and decode it.
    pub fn read_dataset(mut self) -> Result<SavDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_sav_data(&data, &self.options)
    }
}

impl SavReader<File> {
    /// Open a `.sav` file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, SavReaderOptions::default())
    }

    /// Open a `.sav` file with options.
    pub fn open_with_options(path: &Path, options: SavReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SavError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SavError::Io(e)
            }
        })?;
        Ok(Self::with_options(file, options))
    }
}

/// Read a `.sav` file from a path.
pub fn read_sav(path: &Path) -> Result<SavDataset> {
    SavReader::open(path)?.read_dataset()
}

/// Read a `.sav` file with options.
pub fn read_sav_with_options(path: &Path, options: SavReaderOptions) -> Result<SavDataset> {
    SavReader::open_with_options(path, options)?.read_dataset()
}

/// One physical variable: a numeric or a string segment plus its
/// continuation slots.
struct Segment {
    raw: RawVariable,
    /// 0-based index of the first slot.
    slot: usize,
    n_slots: usize,
}

/// Dictionary records collected before interpretation.
#[derive(Default)]
struct RawDictionary<'a> {
    variables: Vec<RawVariable>,
    value_labels: Vec<(Vec<([u8; 8], Vec<u8>)>, Vec<usize>)>,
    extensions: Vec<ExtensionRecord<'a>>,
}

/// Decode a complete `.sav` file held in memory.
pub fn parse_sav_data(data: &[u8], options: &SavReaderOptions) -> Result<SavDataset> {
    let header = FileHeader::parse(data)?;
    if !matches!(header.compression, 0 | 1) {
        return Err(SavError::UnsupportedCompression {
            code: header.compression,
        });
    }

    let mut reader = ByteReader::new(data, header.endian);
    reader.set_position(FILE_HEADER_LEN);
    let dict = read_dictionary(&mut reader)?;

    let encoding = detect_encoding(&dict, &reader, options);
    let decode = |bytes: &[u8]| encoding.decode_without_bom_handling(bytes).0.into_owned();
    let decode_trimmed = |bytes: &[u8]| decode(trim_padding(bytes));

    let segments = group_segments(dict.variables);
    let n_slots: usize = segments.iter().map(|s| s.n_slots).sum();

    let mut long_names = HashMap::new();
    let mut very_long = HashMap::new();
    for ext in &dict.extensions {
        match ext.subtype {
            EXT_LONG_NAMES => {
                long_names.extend(parse_long_names(&decode(ext.data)));
            }
            EXT_VERY_LONG_STRINGS => {
                very_long.extend(parse_very_long_strings(&decode(ext.data)));
            }
            _ => {}
        }
    }

    // Fold very long string segments into logical variables.
    let mut variables = Vec::new();
    // (first segment index, segment count) per variable
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < segments.len() {
        let segment = &segments[idx];
        let short = decode_trimmed(&segment.raw.name);
        let (width, n_segments) = match very_long.get(&short) {
            Some(&width) if segment.raw.width > 0 => {
                let width = width.min(usize::from(VarWidth::MAX_STRING));
                let n = VarWidth::String(width as u16).segment_widths().len();
                (VarWidth::String(width as u16), n.min(segments.len() - idx))
            }
            _ if segment.raw.width > 0 => (VarWidth::String(segment.raw.width as u16), 1),
            _ => (VarWidth::Numeric, 1),
        };

        let name = long_names.get(&short).cloned().unwrap_or(short);
        let mut variable = SavVariable {
            name,
            width,
            label: segment.raw.label.as_deref().map(decode_trimmed),
            value_labels: Vec::new(),
            measure: Measure::Unknown,
            format: SavFormat::from_raw(segment.raw.print_format),
            missing: MissingValues::None,
        };
        variable.missing = decode_missing(&segment.raw, width, &reader, &decode_trimmed);
        variables.push(variable);
        spans.push((idx, n_segments));
        idx += n_segments;
    }

    // Type 3/4 value labels reference the first slot (1-based).
    let slot_to_var: HashMap<usize, usize> = spans
        .iter()
        .enumerate()
        .map(|(var_idx, (seg_idx, _))| (segments[*seg_idx].slot + 1, var_idx))
        .collect();
    for (labels, indices) in &dict.value_labels {
        for index in indices {
            let Some(&var_idx) = slot_to_var.get(index) else {
                continue;
            };
            let variable = &mut variables[var_idx];
            for (value, label) in labels {
                let value = if variable.width.is_numeric() {
                    LabelValue::Number(reader.f64_from(*value))
                } else {
                    LabelValue::Text(decode_trimmed(value))
                };
                variable.value_labels.push(ValueLabel {
                    value,
                    label: decode_trimmed(label),
                });
            }
        }
    }

    for ext in &dict.extensions {
        match ext.subtype {
            EXT_LONG_STRING_LABELS => {
                for set in parse_long_string_labels(ext, &reader)? {
                    let name = decode_trimmed(&set.name);
                    let Some(variable) = variables.iter_mut().find(|v| v.name == name) else {
                        continue;
                    };
                    for (value, label) in set.labels {
                        variable.value_labels.push(ValueLabel {
                            value: LabelValue::Text(decode_trimmed(&value)),
                            label: decode_trimmed(&label),
                        });
                    }
                }
            }
            EXT_DISPLAY => {
                if let Some(params) = parse_display_params(ext, &reader, segments.len())? {
                    for (variable, (seg_idx, _)) in variables.iter_mut().zip(&spans) {
                        variable.measure = Measure::from_code(params[*seg_idx].measure);
                    }
                }
            }
            _ => {}
        }
    }

    let case_data = match header.compression {
        1 => decompress(reader.remaining(), header.bias, header.endian)?,
        _ => reader.remaining().to_vec(),
    };
    let case_len = n_slots * 8;
    let available = if case_len == 0 {
        0
    } else {
        case_data.len() / case_len
    };
    let n_cases = usize::try_from(header.n_cases)
        .map(|n| n.min(available))
        .unwrap_or(available);

    let mut rows = Vec::with_capacity(n_cases);
    for case in case_data.chunks_exact(case_len.max(1)).take(n_cases) {
        let mut row = Vec::with_capacity(variables.len());
        for (variable, (seg_idx, n_segments)) in variables.iter().zip(&spans) {
            let value = match variable.width {
                VarWidth::Numeric => {
                    let offset = segments[*seg_idx].slot * 8;
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&case[offset..offset + 8]);
                    let number = reader.f64_from(raw);
                    if number == SYSMIS
                        || (options.user_missing_as_null && variable.missing.contains_number(number))
                    {
                        SavValue::Number(None)
                    } else {
                        SavValue::Number(Some(number))
                    }
                }
                VarWidth::String(width) => {
                    let mut bytes = Vec::with_capacity(usize::from(width));
                    for segment in &segments[*seg_idx..*seg_idx + *n_segments] {
                        let offset = segment.slot * 8;
                        let used = (segment.raw.width.max(0) as usize)
                            .min(255)
                            .min(segment.n_slots * 8);
                        bytes.extend_from_slice(&case[offset..offset + used]);
                    }
                    bytes.truncate(usize::from(width));
                    let text = decode_trimmed(&bytes);
                    if options.user_missing_as_null && variable.missing.contains_text(&text) {
                        SavValue::Text(String::new())
                    } else {
                        SavValue::Text(text)
                    }
                }
            };
            row.push(value);
        }
        rows.push(row);
    }

    let file_label = decode_trimmed(&header.file_label);
    Ok(SavDataset {
        file_label: (!file_label.is_empty()).then_some(file_label),
        encoding: Some(encoding.name().to_string()),
        variables,
        rows,
    })
}

fn read_dictionary<'a>(reader: &mut ByteReader<'a>) -> Result<RawDictionary<'a>> {
    let mut dict = RawDictionary::default();
    loop {
        let offset = reader.position();
        match reader.i32()? {
            REC_VARIABLE => dict.variables.push(RawVariable::parse(reader)?),
            REC_VALUE_LABELS => {
                let labels = parse_value_labels(reader)?;
                let offset = reader.position();
                let next = reader.i32()?;
                if next != REC_VALUE_LABEL_VARS {
                    return Err(SavError::UnknownRecord {
                        record_type: next,
                        offset,
                    });
                }
                let indices = parse_value_label_vars(reader)?;
                dict.value_labels.push((labels, indices));
            }
            REC_DOCUMENT => {
                let lines = reader.count()?;
                reader.skip(lines * 80)?;
            }
            REC_EXTENSION => dict.extensions.push(ExtensionRecord::parse(reader)?),
            REC_END => {
                reader.skip(4)?;
                return Ok(dict);
            }
            record_type => {
                return Err(SavError::UnknownRecord {
                    record_type,
                    offset,
                });
            }
        }
    }
}

fn group_segments(raw: Vec<RawVariable>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for (slot, variable) in raw.into_iter().enumerate() {
        if variable.is_continuation() {
            if let Some(last) = segments.last_mut() {
                last.n_slots += 1;
            }
            continue;
        }
        segments.push(Segment {
            raw: variable,
            slot,
            n_slots: 1,
        });
    }
    segments
}

fn detect_encoding(
    dict: &RawDictionary<'_>,
    reader: &ByteReader<'_>,
    options: &SavReaderOptions,
) -> &'static Encoding {
    let declared = dict
        .extensions
        .iter()
        .find(|ext| ext.subtype == EXT_ENCODING)
        .and_then(|ext| Encoding::for_label(trim_padding(ext.data)));
    if let Some(encoding) = declared {
        return encoding;
    }

    let code = dict
        .extensions
        .iter()
        .find(|ext| ext.subtype == EXT_INTEGER_INFO)
        .and_then(|ext| parse_character_code(ext, reader));
    if let Some(encoding) = code.and_then(codepage_encoding) {
        return encoding;
    }

    options
        .fallback_encoding
        .as_deref()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(WINDOWS_1252)
}

fn codepage_encoding(code: i32) -> Option<&'static Encoding> {
    match code {
        CODEPAGE_UTF8 => Some(UTF_8),
        // ASCII and Latin-1 both decode safely as windows-1252.
        2 | 3 | 20127 | 28591 | 1252 => Some(WINDOWS_1252),
        code @ 1250..=1258 => Encoding::for_label(format!("windows-{code}").as_bytes()),
        932 => Encoding::for_label(b"shift_jis"),
        936 => Encoding::for_label(b"gbk"),
        949 => Encoding::for_label(b"euc-kr"),
        950 => Encoding::for_label(b"big5"),
        _ => None,
    }
}

fn decode_missing(
    raw: &RawVariable,
    width: VarWidth,
    reader: &ByteReader<'_>,
    decode: &dyn Fn(&[u8]) -> String,
) -> MissingValues {
    let number = |bytes: &[u8; 8]| reader.f64_from(*bytes);
    match (raw.missing_code, width) {
        (0, _) => MissingValues::None,
        (-2, VarWidth::Numeric) if raw.missing.len() == 2 => MissingValues::Range {
            low: number(&raw.missing[0]),
            high: number(&raw.missing[1]),
        },
        (-3, VarWidth::Numeric) if raw.missing.len() == 3 => MissingValues::RangeAndValue {
            low: number(&raw.missing[0]),
            high: number(&raw.missing[1]),
            value: number(&raw.missing[2]),
        },
        (_, VarWidth::Numeric) => MissingValues::Discrete(
            raw.missing
                .iter()
                .map(|v| LabelValue::Number(number(v)))
                .collect(),
        ),
        (_, VarWidth::String(_)) => MissingValues::Discrete(
            raw.missing
                .iter()
                .map(|v| LabelValue::Text(decode(v)))
                .collect(),
        ),
    }
}
