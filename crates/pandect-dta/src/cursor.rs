//! Byte cursor with tag matching.

use crate::error::{DtaError, Result};

/// Sequential reader over an in-memory `.dta` file.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    big_endian: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            big_endian: false,
        }
    }

    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(DtaError::invalid_format(format!(
                "offset {pos} beyond end of file"
            )));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(DtaError::UnexpectedEof { offset: self.pos })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// True if the upcoming bytes equal `bytes`.
    pub fn peek(&self, bytes: &[u8]) -> bool {
        self.data[self.pos.min(self.data.len())..].starts_with(bytes)
    }

    /// Consume `<tag>`.
    pub fn open(&mut self, tag: &'static str) -> Result<()> {
        self.expect(tag, false)
    }

    /// Consume `</tag>`.
    pub fn close(&mut self, tag: &'static str) -> Result<()> {
        self.expect(tag, true)
    }

    fn expect(&mut self, tag: &'static str, closing: bool) -> Result<()> {
        let text = if closing {
            format!("</{tag}>")
        } else {
            format!("<{tag}>")
        };
        if !self.peek(text.as_bytes()) {
            return Err(DtaError::MissingTag {
                tag,
                offset: self.pos,
            });
        }
        self.pos += text.len();
        Ok(())
    }

    /// Unsigned integer of 1 to 8 bytes in file byte order.
    pub fn uint(&mut self, width: usize) -> Result<u64> {
        let bytes = self.take(width)?;
        Ok(uint_from(bytes, self.big_endian))
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(self.uint(2)? as u16)
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(self.uint(4)? as u32)
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.uint(8)
    }

    /// Length or count field converted to `usize`.
    pub fn length(&mut self, width: usize) -> Result<usize> {
        let offset = self.pos;
        usize::try_from(self.uint(width)?)
            .map_err(|_| DtaError::invalid_format(format!("length too large at {offset}")))
    }
}

/// Decode an unsigned integer of up to 8 bytes.
pub fn uint_from(bytes: &[u8], big_endian: bool) -> u64 {
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    if big_endian {
        bytes.iter().fold(0, fold)
    } else {
        bytes.iter().rev().fold(0, fold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        let mut cursor = Cursor::new(b"<K>\x02\x00</K>");
        cursor.open("K").unwrap();
        assert_eq!(cursor.u16().unwrap(), 2);
        cursor.close("K").unwrap();
        assert!(matches!(
            cursor.open("N"),
            Err(DtaError::MissingTag { tag: "N", .. })
        ));
    }

    #[test]
    fn test_uint_orders() {
        assert_eq!(uint_from(&[1, 0, 0], false), 1);
        assert_eq!(uint_from(&[1, 0, 0], true), 65536);
    }
}
