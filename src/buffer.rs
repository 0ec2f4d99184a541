// buffer.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Byte buffer with separate size and index cursors
use crate::error::{Error, Result};
use crate::stream::Stream;

/// Fixed-allocation byte storage.
///
/// Content is tracked by two cursors:
/// * `size`: logical length of the content
/// * `index`: write position for index-tracked copies
///
/// Both stay within `0..=allocated`.  An operation which would exceed the
/// allocation fails without changing anything.
#[derive(Debug)]
pub struct Buffer {
    /// Zero-filled storage (length is the allocation)
    data: Vec<u8>,
    /// Logical content size
    size: usize,
    /// Write cursor
    index: usize,
}

impl Buffer {
    /// Amount added to the allocation when a buffer grows
    pub const GROW_SZ: usize = 1024;

    /// Allocate a new zero-filled buffer.
    pub fn new(allocated: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(allocated)?;
        data.resize(allocated, 0);
        Ok(Buffer {
            data,
            size: 0,
            index: 0,
        })
    }

    /// Get the allocated size
    pub fn allocated(&self) -> usize {
        self.data.len()
    }

    /// Get the logical content size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the write cursor
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the content (up to `size`)
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Get the entire allocation
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the entire allocation
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Fill `count` bytes after the content from a stream.
    ///
    /// On success, `size` advances by `count`; `index` is untouched.
    pub fn fill_from<S: Stream>(
        &mut self,
        stream: &mut S,
        count: usize,
    ) -> Result<()> {
        let end = self.size + count;
        if end > self.allocated() {
            return Err(Error::BufferOverflow);
        }
        stream.read_into(&mut self.data[self.size..end])?;
        self.size = end;
        Ok(())
    }

    /// Copy bytes in at the write cursor.
    ///
    /// The bound is checked against `size`, then `index` advances and
    /// `size` is raised to `index` when it falls behind.
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if self.size + bytes.len() > self.allocated() {
            return Err(Error::BufferOverflow);
        }
        let end = self.index + bytes.len();
        self.data[self.index..end].copy_from_slice(bytes);
        self.index = end;
        self.size = self.size.max(self.index);
        Ok(())
    }

    /// Copy the content (`size` bytes) out to a slice.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than `size`.
    pub fn copy_to_slice(&self, dest: &mut [u8]) {
        dest[..self.size].copy_from_slice(self.as_slice());
    }

    /// Append the indexed bytes (`0..index`) of another buffer at the write
    /// cursor.
    pub fn append(&mut self, src: &Buffer) -> Result<()> {
        if self.index + src.index > self.allocated() {
            return Err(Error::BufferOverflow);
        }
        let end = self.index + src.index;
        self.data[self.index..end].copy_from_slice(&src.data[..src.index]);
        self.index = end;
        self.size = self.size.max(self.index);
        Ok(())
    }

    /// Overwrite content with the content of another buffer.
    ///
    /// Content longer than this allocation is truncated.  Sets `size` to the
    /// number of bytes copied; `index` is untouched.
    pub fn copy_from(&mut self, src: &Buffer) {
        let count = src.size.min(self.allocated());
        self.data[..count].copy_from_slice(&src.data[..count]);
        self.size = count;
    }

    /// Zero-fill storage and reset both cursors.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|b| *b = 0);
        self.size = 0;
        self.index = 0;
    }

    /// Reset both cursors, leaving storage as is.
    pub fn rewind(&mut self) {
        self.size = 0;
        self.index = 0;
    }

    /// Get the byte at the write cursor
    pub(crate) fn byte_at_index(&self) -> Option<u8> {
        if self.index < self.size {
            Some(self.data[self.index])
        } else {
            None
        }
    }

    /// Advance the write cursor by one byte, within the content
    pub(crate) fn advance_index(&mut self) {
        if self.index < self.size {
            self.index += 1;
        }
    }

    /// Make sure the buffer can hold more than `needed` bytes.
    ///
    /// A buffer is never resized in place: when it is too small, a larger
    /// one is allocated, the content copied over and the old one dropped.
    /// The returned buffer replaces `self`.
    pub fn grow(self, needed: usize) -> Result<Buffer> {
        if self.allocated() > needed {
            return Ok(self);
        }
        let allocated = (self.allocated() + Self::GROW_SZ).max(needed + 1);
        let mut buffer = Buffer::new(allocated)?;
        buffer.copy_from(&self);
        Ok(buffer)
    }
}
