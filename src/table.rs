// table.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! LZW code table
use crate::buffer::Buffer;
use crate::error::{Error, Result};

/// Code type
pub(crate) type Code = u16;

/// Number of slots (12-bit code space)
pub(crate) const TABLE_SZ: usize = 4096;

/// Largest representable code
const MAX_CODE: Code = (TABLE_SZ - 1) as Code;

/// Table mapping codes to the index strings they expand to.
///
/// Slots below the clear code hold fixed single-byte strings; the slots
/// after the end code are filled in order as decoding proceeds.
#[derive(Debug)]
pub(crate) struct CodeTable {
    /// Expanded strings, one optional entry per code
    entries: Vec<Option<Box<[u8]>>>,
}

impl CodeTable {
    /// Create an empty code table
    pub fn new() -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(TABLE_SZ)?;
        entries.resize(TABLE_SZ, None);
        Ok(CodeTable { entries })
    }

    /// Release entries from slot `n` up to the first empty slot.
    pub fn reset_fixed(&mut self, n: usize) {
        for entry in self.entries.iter_mut().skip(n) {
            if entry.take().is_none() {
                break;
            }
        }
    }

    /// Fill slots `0..n` with the singleton string of each code.
    pub fn init_fixed(&mut self, n: usize) -> Result<()> {
        for (code, entry) in self.entries.iter_mut().take(n).enumerate() {
            let mut v = Vec::new();
            v.try_reserve_exact(1)?;
            v.push(code as u8);
            *entry = Some(v.into_boxed_slice());
        }
        Ok(())
    }

    /// Store the content of `prefix` followed by `byte` at an empty slot.
    pub fn add(&mut self, slot: Code, prefix: &Buffer, byte: u8) -> Result<()> {
        let entry = self
            .entries
            .get_mut(usize::from(slot))
            .ok_or(Error::CodeOutOfRange(slot))?;
        if entry.is_some() {
            return Err(Error::SlotOccupied(slot));
        }
        let len = prefix.size() + 1;
        let mut v = Vec::new();
        v.try_reserve_exact(len)?;
        v.resize(len, byte);
        prefix.copy_to_slice(&mut v);
        *entry = Some(v.into_boxed_slice());
        Ok(())
    }

    /// Get the string for a code
    pub fn entry(&self, code: Code) -> Option<&[u8]> {
        self.entries.get(usize::from(code)).and_then(|e| e.as_deref())
    }

    /// Check whether a code has an entry
    pub fn contains(&self, code: Code) -> bool {
        self.entry(code).is_some()
    }

    /// Get the length of a code's string (zero if empty)
    pub fn len(&self, code: Code) -> usize {
        self.entry(code).map_or(0, |e| e.len())
    }

    /// Write the full string for a code to a buffer at its write cursor.
    pub fn translate(&self, code: Code, out: &mut Buffer) -> Result<()> {
        if code > MAX_CODE {
            return Err(Error::CodeOutOfRange(code));
        }
        let entry = self.entry(code).ok_or(Error::UndefinedCode(code))?;
        out.put_slice(entry)
    }

    /// Get the byte of a code whose string is exactly one byte long.
    pub fn translate_single(&self, code: Code) -> Result<u8> {
        if code > MAX_CODE {
            return Err(Error::CodeOutOfRange(code));
        }
        match self.entry(code) {
            Some(&[byte]) => Ok(byte),
            _ => Err(Error::UndefinedCode(code)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn prefix(bytes: &[u8]) -> Buffer {
        let mut b = Buffer::new(bytes.len()).unwrap();
        b.put_slice(bytes).unwrap();
        b
    }

    #[test]
    fn fixed_codes() -> Result<()> {
        let mut t = CodeTable::new()?;
        t.init_fixed(4)?;
        for code in 0..4 {
            assert_eq!(t.translate_single(code)?, code as u8);
        }
        assert!(!t.contains(4));
        assert!(matches!(t.translate_single(4), Err(Error::UndefinedCode(4))));
        Ok(())
    }

    #[test]
    fn add_and_translate() -> Result<()> {
        let mut t = CodeTable::new()?;
        t.init_fixed(4)?;
        t.add(6, &prefix(&[1, 2]), 3)?;
        assert_eq!(t.entry(6), Some(&[1, 2, 3][..]));
        assert_eq!(t.len(6), 3);
        assert!(matches!(
            t.add(6, &prefix(&[1]), 1),
            Err(Error::SlotOccupied(6))
        ));
        assert!(matches!(t.translate_single(6), Err(Error::UndefinedCode(6))));
        let mut out = Buffer::new(4)?;
        t.translate(6, &mut out)?;
        t.translate(0, &mut out)?;
        assert_eq!(out.as_slice(), &[1, 2, 3, 0]);
        assert!(matches!(t.translate(1, &mut out), Err(Error::BufferOverflow)));
        Ok(())
    }

    #[test]
    fn capacity() -> Result<()> {
        let mut t = CodeTable::new()?;
        t.add(4095, &prefix(&[]), 1)?;
        assert!(matches!(
            t.add(4096, &prefix(&[]), 1),
            Err(Error::CodeOutOfRange(4096))
        ));
        let mut out = Buffer::new(4)?;
        assert!(matches!(
            t.translate(4096, &mut out),
            Err(Error::CodeOutOfRange(4096))
        ));
        Ok(())
    }

    #[test]
    fn reset_stops_at_gap() -> Result<()> {
        let mut t = CodeTable::new()?;
        t.init_fixed(4)?;
        t.add(6, &prefix(&[0]), 1)?;
        t.add(7, &prefix(&[1]), 1)?;
        t.reset_fixed(6);
        assert!(!t.contains(6));
        assert!(!t.contains(7));
        assert!(t.contains(3));
        t.add(6, &prefix(&[2]), 2)?;
        assert_eq!(t.entry(6), Some(&[2, 2][..]));
        Ok(())
    }
}
