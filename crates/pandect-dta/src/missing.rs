//! Numeric storage and Stata missing values.
//!
//! Each numeric type reserves the top of its range for the system missing
//! value `.` and the extended missing values `.a` to `.z`. All 27 decode
//! to `None`; `None` is written as `.`.

use crate::types::DtaType;

pub const BYTE_MISSING: i8 = 101;
pub const INT_MISSING: i16 = 32741;
pub const LONG_MISSING: i32 = 2_147_483_621;
pub const FLOAT_MISSING_BITS: u32 = 0x7f00_0000;
pub const DOUBLE_MISSING_BITS: u64 = 0x7fe0_0000_0000_0000;

/// Decode a numeric value from its row bytes.
pub fn decode_number(dtype: DtaType, bytes: &[u8], big_endian: bool) -> Option<f64> {
    let raw = crate::cursor::uint_from(bytes, big_endian);
    match dtype {
        DtaType::Byte => {
            let v = raw as u8 as i8;
            (v <= 100).then_some(f64::from(v))
        }
        DtaType::Int => {
            let v = raw as u16 as i16;
            (v <= 32740).then_some(f64::from(v))
        }
        DtaType::Long => {
            let v = raw as u32 as i32;
            (v <= 2_147_483_620).then_some(f64::from(v))
        }
        DtaType::Float => {
            let v = f32::from_bits(raw as u32);
            (v.is_finite() && v < f32::from_bits(FLOAT_MISSING_BITS)).then_some(f64::from(v))
        }
        DtaType::Double => {
            let v = f64::from_bits(raw);
            (v.is_finite() && v < f64::from_bits(DOUBLE_MISSING_BITS)).then_some(v)
        }
        DtaType::Str(_) | DtaType::StrL => None,
    }
}

/// Encode a numeric value little-endian. Returns `None` if the value does
/// not fit the storage type.
pub fn encode_number(dtype: DtaType, value: Option<f64>) -> Option<Vec<u8>> {
    let integral = |v: f64, lo: f64, hi: f64| v.fract() == 0.0 && (lo..=hi).contains(&v);
    match (dtype, value) {
        (DtaType::Byte, None) => Some(BYTE_MISSING.to_le_bytes().to_vec()),
        (DtaType::Byte, Some(v)) => {
            integral(v, -127.0, 100.0).then(|| (v as i8).to_le_bytes().to_vec())
        }
        (DtaType::Int, None) => Some(INT_MISSING.to_le_bytes().to_vec()),
        (DtaType::Int, Some(v)) => {
            integral(v, -32767.0, 32740.0).then(|| (v as i16).to_le_bytes().to_vec())
        }
        (DtaType::Long, None) => Some(LONG_MISSING.to_le_bytes().to_vec()),
        (DtaType::Long, Some(v)) => integral(v, -2_147_483_647.0, 2_147_483_620.0)
            .then(|| (v as i32).to_le_bytes().to_vec()),
        (DtaType::Float, None) => Some(FLOAT_MISSING_BITS.to_le_bytes().to_vec()),
        (DtaType::Float, Some(v)) => {
            let f = v as f32;
            (f.is_finite() && f < f32::from_bits(FLOAT_MISSING_BITS))
                .then(|| f.to_le_bytes().to_vec())
        }
        (DtaType::Double, None) => Some(DOUBLE_MISSING_BITS.to_le_bytes().to_vec()),
        (DtaType::Double, Some(v)) => {
            (v.is_finite() && v < f64::from_bits(DOUBLE_MISSING_BITS))
                .then(|| v.to_le_bytes().to_vec())
        }
        (DtaType::Str(_) | DtaType::StrL, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_thresholds() {
        assert_eq!(decode_number(DtaType::Byte, &[100], false), Some(100.0));
        assert_eq!(decode_number(DtaType::Byte, &[101], false), None);
        // .z for byte
        assert_eq!(decode_number(DtaType::Byte, &[127], false), None);
        assert_eq!(
            decode_number(DtaType::Int, &32741i16.to_le_bytes(), false),
            None
        );
        assert_eq!(
            decode_number(DtaType::Long, &(-5i32).to_be_bytes(), true),
            Some(-5.0)
        );
        let extended = (DOUBLE_MISSING_BITS + 0x1000).to_le_bytes();
        assert_eq!(decode_number(DtaType::Double, &extended, false), None);
    }

    #[test]
    fn test_encode_roundtrip() {
        for (dtype, value) in [
            (DtaType::Byte, Some(-3.0)),
            (DtaType::Int, Some(1200.0)),
            (DtaType::Long, Some(-70000.0)),
            (DtaType::Float, Some(1.5)),
            (DtaType::Double, Some(3.25)),
            (DtaType::Double, None),
            (DtaType::Byte, None),
        ] {
            let bytes = encode_number(dtype, value).unwrap();
            assert_eq!(bytes.len(), dtype.width());
            assert_eq!(decode_number(dtype, &bytes, false), value);
        }
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(encode_number(DtaType::Byte, Some(101.0)), None);
        assert_eq!(encode_number(DtaType::Int, Some(1.5)), None);
    }
}
