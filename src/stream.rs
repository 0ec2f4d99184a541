// stream.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Stream capability used by the decoder
use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Source of GIF bytes.
///
/// The decoder only ever reads forward, except while measuring comment and
/// application payloads, where it moves back to re-read what it skipped.
///
/// Any `Read + Seek` is a stream, with `move_by` calling
/// `seek(SeekFrom::Current(..))`.  On a `BufReader` each such seek
/// discards the read buffer, and comments move once per sub-block while
/// applications move once per zero byte in their payload.  For GIFs with
/// large comments or application blocks, decoding from memory (a
/// `Cursor` over the file contents) avoids those extra reads.
pub trait Stream {
    /// Fill the whole buffer, advancing the position on success.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Move the position by a signed number of bytes.
    fn move_by(&mut self, offset: i64) -> Result<()>;
}

impl<T: Read + Seek> Stream for T {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_exact(buf)?;
        Ok(())
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        Seek::seek(self, SeekFrom::Current(offset))?;
        Ok(())
    }
}

/// Stream built from a pair of callbacks.
///
/// ## Example
/// ```
/// use gifmodel::{Decoder, FnStream};
/// use std::cell::Cell;
///
/// let gif = [
///     0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00,
///     0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
///     0x00, 0x02, 0x02, 0x54, 0x01, 0x00, 0x3b,
/// ];
/// let pos = Cell::new(0usize);
/// let stream = FnStream::new(
///     |buf: &mut [u8]| {
///         let start = pos.get();
///         match gif.get(start..start + buf.len()) {
///             Some(src) => {
///                 buf.copy_from_slice(src);
///                 pos.set(start + buf.len());
///                 true
///             }
///             None => false,
///         }
///     },
///     |offset: i64| {
///         let p = pos.get() as i64 + offset;
///         pos.set(p as usize);
///         p >= 0
///     },
/// );
/// let model = Decoder::new(stream).decode().unwrap();
/// assert_eq!(model.images()[0].indices(), &[2]);
/// ```
pub struct FnStream<R, M>
where
    R: FnMut(&mut [u8]) -> bool,
    M: FnMut(i64) -> bool,
{
    /// Read callback
    read: R,
    /// Move callback
    mv: M,
}

impl<R, M> FnStream<R, M>
where
    R: FnMut(&mut [u8]) -> bool,
    M: FnMut(i64) -> bool,
{
    /// Create a stream from read and move callbacks.
    pub fn new(read: R, mv: M) -> Self {
        FnStream { read, mv }
    }
}

impl<R, M> Stream for FnStream<R, M>
where
    R: FnMut(&mut [u8]) -> bool,
    M: FnMut(i64) -> bool,
{
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        if (self.read)(buf) {
            Ok(())
        } else {
            Err(Error::StreamRead)
        }
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        if (self.mv)(offset) {
            Ok(())
        } else {
            Err(Error::StreamSeek)
        }
    }
}

/// Read one byte from a stream
pub(crate) fn read_u8<S: Stream>(stream: &mut S) -> Result<u8> {
    let mut buf = [0; 1];
    stream.read_into(&mut buf)?;
    Ok(buf[0])
}
