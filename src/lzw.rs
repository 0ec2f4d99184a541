// lzw.rs
//
// Copyright (c) 2020-2025  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::stream::{read_u8, Stream};
use crate::table::{Code, CodeTable, TABLE_SZ};
use std::ops::AddAssign;

/// Largest data sub-block
const CHUNK_SZ: usize = 255;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u32 {
        1 << u32::from(self.0)
    }
}

/// Reader for packed codes within data sub-blocks
#[derive(Debug)]
struct CodeReader {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Bit position within the current byte
    bit_ptr: u8,
    /// Codes allowed at the current size
    total_codes: u32,
    /// Codes read at the current size
    code_count: u32,
    /// Current sub-block (read position is its index)
    chunk: Buffer,
    /// Block terminator was read
    terminated: bool,
}

impl CodeReader {
    /// Create a new code reader
    fn new(min_code_bits: u8) -> Result<Self> {
        Ok(CodeReader {
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            bit_ptr: 0,
            total_codes: 1 << min_code_bits,
            code_count: 0,
            chunk: Buffer::new(CHUNK_SZ)?,
            terminated: false,
        })
    }

    /// Reset code size after a clear code.
    ///
    /// The clear code counts as the first code at the new size.
    fn reset(&mut self) {
        self.code_bits = Bits::from(self.min_code_bits + 1);
        self.total_codes = 1 << self.min_code_bits;
        self.code_count = 1;
    }

    /// Read the next sub-block into the chunk.
    ///
    /// Returns `false` at the block terminator.
    fn next_chunk<S: Stream>(&mut self, stream: &mut S) -> Result<bool> {
        let size = read_u8(stream)?;
        if size == 0 {
            self.terminated = true;
            return Ok(false);
        }
        self.chunk.rewind();
        self.chunk.fill_from(stream, size.into())?;
        Ok(true)
    }

    /// Read one code, least-significant bit first.
    ///
    /// Returns `None` when the block terminator is reached.
    fn read_code<S: Stream>(&mut self, stream: &mut S) -> Result<Option<Code>> {
        if self.terminated {
            return Ok(None);
        }
        if self.code_count == self.total_codes && self.code_bits != Bits::MAX
        {
            self.total_codes = self.code_bits.entries();
            self.code_bits += 1;
            self.code_count = 0;
            trace!("code bits: {}", u8::from(self.code_bits));
        }
        let bits = u8::from(self.code_bits);
        let mut code: u16 = 0;
        let mut n_bits = 0;
        while n_bits < bits {
            let byte = match self.chunk.byte_at_index() {
                Some(byte) => byte,
                None => {
                    if !self.next_chunk(stream)? {
                        return Ok(None);
                    }
                    continue;
                }
            };
            let w = (8 - self.bit_ptr).min(bits - n_bits);
            let c = u16::from(byte >> self.bit_ptr) & ((1 << w) - 1);
            code |= c << n_bits;
            self.bit_ptr += w;
            n_bits += w;
            if self.bit_ptr == 8 {
                self.chunk.advance_index();
                self.bit_ptr = 0;
            }
        }
        if self.code_count < self.total_codes {
            self.code_count += 1;
        }
        Ok(Some(code))
    }
}

/// LZW Data Decompressor
#[derive(Debug)]
pub(crate) struct Decompressor {
    /// Code reader
    reader: CodeReader,
    /// Code table
    table: CodeTable,
    /// Clear code
    clear_code: Code,
    /// End of information code
    end_code: Code,
    /// Next code to be added to the table
    next_code: Code,
    /// Previous code (none right after a clear code)
    old_code: Option<Code>,
    /// First index of the most recent expansion
    first: u8,
    /// Scratch buffer for one code's expansion
    scratch: Buffer,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if min_code_bits < 1 || min_code_bits > 8 {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        let clear_code: Code = 1 << min_code_bits;
        let mut table = CodeTable::new()?;
        table.init_fixed(clear_code.into())?;
        Ok(Decompressor {
            reader: CodeReader::new(min_code_bits)?,
            table,
            clear_code,
            end_code: clear_code + 1,
            next_code: clear_code + 2,
            old_code: None,
            first: 0,
            scratch: Buffer::new(Buffer::GROW_SZ)?,
        })
    }

    /// Reset the table and code size after a clear code
    fn reset(&mut self) -> Result<()> {
        trace!("clear code");
        let fixed = usize::from(self.clear_code);
        self.table.reset_fixed(fixed + 2);
        self.table.init_fixed(fixed)?;
        self.next_code = self.end_code + 1;
        self.old_code = None;
        self.reader.reset();
        Ok(())
    }

    /// Decompress image data from a stream into a buffer.
    ///
    /// Returns `true` if an end code was found.
    pub fn decompress<S: Stream>(
        &mut self,
        stream: &mut S,
        out: &mut Buffer,
    ) -> Result<bool> {
        match self.reader.read_code(stream)? {
            Some(code) if code == self.clear_code => self.reset()?,
            Some(_) => return Err(Error::MissingClearCode),
            None => return Ok(false),
        }
        loop {
            let code = match self.reader.read_code(stream)? {
                Some(code) => code,
                None => return Ok(false),
            };
            if code == self.clear_code {
                self.reset()?;
            } else if code == self.end_code {
                return Ok(true);
            } else {
                match self.old_code {
                    Some(old) => self.decompress_code(old, code, out)?,
                    None => {
                        self.table.translate(code, out)?;
                        self.first = self.table.translate_single(code)?;
                    }
                }
                self.old_code = Some(code);
            }
        }
    }

    /// Decompress one code following `old`
    fn decompress_code(
        &mut self,
        old: Code,
        code: Code,
        out: &mut Buffer,
    ) -> Result<()> {
        let needed = self.table.len(code).max(self.table.len(old) + 1);
        let scratch = std::mem::replace(&mut self.scratch, Buffer::new(0)?);
        self.scratch = scratch.grow(needed)?;
        self.scratch.rewind();
        if self.table.contains(code) {
            self.table.translate(code, &mut self.scratch)?;
        } else if code == self.next_code {
            self.table.translate(old, &mut self.scratch)?;
            self.scratch.put_slice(&[self.first])?;
        } else {
            return Err(Error::InvalidLzwData);
        }
        out.append(&self.scratch)?;
        self.first = self.scratch.as_slice()[0];
        if usize::from(self.next_code) < TABLE_SZ {
            self.scratch.rewind();
            self.table.translate(old, &mut self.scratch)?;
            self.table.add(self.next_code, &self.scratch, self.first)?;
            self.next_code += 1;
        }
        Ok(())
    }

    /// Consume the block terminator, if not already read
    fn finish<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        if !self.reader.terminated && read_u8(stream)? != 0 {
            return Err(Error::MissingBlockTerminator);
        }
        Ok(())
    }
}

/// Decompress one image's data (minimum code size byte and data sub-blocks)
/// into a buffer.
pub(crate) fn decompress<S: Stream>(
    stream: &mut S,
    out: &mut Buffer,
) -> Result<()> {
    let min_code_bits = read_u8(stream)?;
    let mut dec = Decompressor::new(min_code_bits)?;
    if dec.decompress(stream, out)? {
        dec.finish(stream)?;
    } else {
        warn!("image data ended without end code");
    }
    Ok(())
}
