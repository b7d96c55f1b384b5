//! Bytecode compression of case data.
//!
//! Data is a sequence of 8-opcode blocks. Each opcode describes one 8-byte
//! slot; raw slots (opcode 253) follow their block in order.

use std::io::Write;

use crate::error::{Result, SavError};
use crate::header::bytes::{ByteReader, Endian};
use crate::header::file::SYSMIS;

const OP_SKIP: u8 = 0;
const OP_END: u8 = 252;
const OP_RAW: u8 = 253;
const OP_SPACES: u8 = 254;
const OP_SYSMIS: u8 = 255;

/// Expand compressed case data into uncompressed 8-byte slots, encoded in
/// the file's byte order.
pub fn decompress(data: &[u8], bias: f64, endian: Endian) -> Result<Vec<u8>> {
    let mut reader = ByteReader::new(data, endian);
    let mut out = Vec::with_capacity(data.len() * 2);
    let encode = |value: f64| match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    };

    'blocks: while reader.remaining().len() >= 8 {
        let block = reader.take(8)?;
        for &opcode in block {
            match opcode {
                OP_SKIP => {}
                OP_END => break 'blocks,
                OP_RAW => {
                    let offset = reader.position();
                    let raw = reader
                        .take(8)
                        .map_err(|_| SavError::UnexpectedEof { offset })?;
                    out.extend_from_slice(raw);
                }
                OP_SPACES => out.extend_from_slice(b"        "),
                OP_SYSMIS => out.extend(encode(SYSMIS)),
                code => out.extend(encode(f64::from(code) - bias)),
            }
        }
    }
    Ok(out)
}

/// Writes case data with bytecode compression.
pub struct Compressor<W: Write> {
    inner: W,
    bias: f64,
    opcodes: Vec<u8>,
    data: Vec<u8>,
}

impl<W: Write> Compressor<W> {
    pub fn new(inner: W, bias: f64) -> Self {
        Self {
            inner,
            bias,
            opcodes: Vec::with_capacity(8),
            data: Vec::with_capacity(64),
        }
    }

    fn put_opcode(&mut self, opcode: u8) -> Result<()> {
        if self.opcodes.len() >= 8 {
            self.flush_block()?;
        }
        self.opcodes.push(opcode);
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        if !self.opcodes.is_empty() {
            self.opcodes.resize(8, OP_SKIP);
            self.inner.write_all(&self.opcodes)?;
            self.inner.write_all(&self.data)?;
            self.opcodes.clear();
            self.data.clear();
        }
        Ok(())
    }

    pub fn put_number(&mut self, value: Option<f64>) -> Result<()> {
        match value {
            None => self.put_opcode(OP_SYSMIS),
            Some(number)
                if (1.0 - self.bias..=251.0 - self.bias).contains(&number)
                    && number == number.trunc() =>
            {
                self.put_opcode((number + self.bias) as u8)
            }
            Some(number) => {
                self.put_opcode(OP_RAW)?;
                self.data.extend_from_slice(&number.to_le_bytes());
                Ok(())
            }
        }
    }

    /// Write one 8-byte string slot (already space padded).
    pub fn put_string_chunk(&mut self, chunk: &[u8; 8]) -> Result<()> {
        if chunk == b"        " {
            self.put_opcode(OP_SPACES)
        } else {
            self.put_opcode(OP_RAW)?;
            self.data.extend_from_slice(chunk);
            Ok(())
        }
    }

    /// Flush the final partial block and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_block()?;
        Ok(self.inner)
    }
}
