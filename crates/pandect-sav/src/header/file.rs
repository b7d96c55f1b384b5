//! The 176-byte file header.

use chrono::NaiveDateTime;

use super::bytes::{ByteReader, Endian};
use super::fixed;
use crate::error::{Result, SavError};

/// Magic number of an uncompressed or bytecode-compressed file.
pub const MAGIC: &[u8; 4] = b"$FL2";
/// Magic number of a zlib-compressed file.
pub const MAGIC_ZLIB: &[u8; 4] = b"$FL3";
pub const FILE_HEADER_LEN: usize = 176;
/// System-missing value (`-DBL_MAX`).
pub const SYSMIS: f64 = f64::MIN;
/// Compression bias.
pub const BIAS: f64 = 100.0;

const PRODUCT_PREFIX: &str = "@(#) SPSS DATA FILE ";

/// Decoded file header. The label stays raw until the encoding is known.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub endian: Endian,
    pub product: String,
    pub nominal_case_size: i32,
    pub compression: i32,
    /// 1-based slot index of the weight variable, or 0.
    pub weight_index: i32,
    /// Number of cases, or -1 if unknown.
    pub n_cases: i32,
    pub bias: f64,
    pub creation_date: String,
    pub creation_time: String,
    pub file_label: Vec<u8>,
}

impl FileHeader {
    /// Header for a new little-endian file.
    pub fn new(
        product: &str,
        nominal_case_size: usize,
        compression: i32,
        n_cases: usize,
        created: NaiveDateTime,
        file_label: &str,
    ) -> Self {
        Self {
            endian: Endian::Little,
            product: format!("{PRODUCT_PREFIX}{product}"),
            nominal_case_size: i32::try_from(nominal_case_size).unwrap_or(-1),
            compression,
            weight_index: 0,
            n_cases: i32::try_from(n_cases).unwrap_or(-1),
            bias: BIAS,
            creation_date: created.format("%d %b %y").to_string(),
            creation_time: created.format("%H:%M:%S").to_string(),
            file_label: file_label.as_bytes().to_vec(),
        }
    }

    /// Serialize as little-endian bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FILE_HEADER_LEN);
        out.extend_from_slice(MAGIC);
        out.extend(fixed(self.product.as_bytes(), 60, b' '));
        out.extend(2i32.to_le_bytes());
        out.extend(self.nominal_case_size.to_le_bytes());
        out.extend(self.compression.to_le_bytes());
        out.extend(self.weight_index.to_le_bytes());
        out.extend(self.n_cases.to_le_bytes());
        out.extend(self.bias.to_le_bytes());
        out.extend(fixed(self.creation_date.as_bytes(), 9, b' '));
        out.extend(fixed(self.creation_time.as_bytes(), 8, b' '));
        out.extend(fixed(&self.file_label, 64, b' '));
        out.extend([0u8; 3]);
        out
    }

    /// Parse the header at the start of `data`, detecting byte order from
    /// the layout code.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_LEN {
            return Err(SavError::invalid_format("file too small"));
        }
        let magic = &data[..4];
        if magic != MAGIC && magic != MAGIC_ZLIB {
            return Err(SavError::invalid_format("missing $FL2 signature"));
        }

        let mut layout = [0u8; 4];
        layout.copy_from_slice(&data[64..68]);
        let endian = if matches!(i32::from_le_bytes(layout), 2 | 3) {
            Endian::Little
        } else if matches!(i32::from_be_bytes(layout), 2 | 3) {
            Endian::Big
        } else {
            return Err(SavError::invalid_format("unrecognized layout code"));
        };

        let mut reader = ByteReader::new(data, endian);
        reader.skip(4)?;
        let product = String::from_utf8_lossy(reader.take(60)?).trim_end().to_string();
        reader.skip(4)?;
        let nominal_case_size = reader.i32()?;
        let compression = reader.i32()?;
        let weight_index = reader.i32()?;
        let n_cases = reader.i32()?;
        let bias = reader.f64()?;
        let creation_date = String::from_utf8_lossy(reader.take(9)?).to_string();
        let creation_time = String::from_utf8_lossy(reader.take(8)?).to_string();
        let file_label = reader.take(64)?.to_vec();

        Ok(Self {
            endian,
            product,
            nominal_case_size,
            compression,
            weight_index,
            n_cases,
            bias,
            creation_date,
            creation_time,
            file_label,
        })
    }
}
