// private.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Private module for top-level items
use crate::decode::Parser;
use crate::model::Gif;
use crate::stream::Stream;
use crate::Result;

/// GIF stream decoder
///
/// Decodes an entire stream into a [Gif] model.  On failure nothing is
/// returned but the error; all partially decoded data is released.
///
/// ## Example: Decode a GIF from memory
/// ```
/// use gifmodel::Decoder;
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` (or any `Read + Seek`) as "gif"
/// let model = Decoder::new(Cursor::new(gif)).decode()?;
/// for image in model.images() {
///     println!("{}x{}: {:?}", image.width(), image.height(), image.indices());
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Gif]: struct.Gif.html
pub struct Decoder<S: Stream> {
    /// Stream of input data
    stream: S,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
}

impl<S: Stream> Decoder<S> {
    /// Create a new GIF decoder.
    pub fn new(stream: S) -> Self {
        Decoder {
            stream,
            max_image_sz: Some(1 << 25),
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Decode the entire stream.
    pub fn decode(self) -> Result<Gif> {
        Parser::new(self.stream, self.max_image_sz).parse()
    }
}
