// lib.rs      gifmodel crate.
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF decoding into an in-memory model.
//!
//! A [Decoder] reads a whole GIF (87a or 89a) stream through a [Stream]
//! and produces a [Gif]: screen descriptor, color tables, comments,
//! applications and images with fully decompressed color indices.
//!
//! [Decoder]: struct.Decoder.html
//! [Gif]: struct.Gif.html
//! [Stream]: trait.Stream.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod buffer;
mod decode;
mod error;
mod lzw;
mod model;
mod private;
mod stream;
mod table;

pub use crate::buffer::Buffer;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::model::{Application, Comment, Gif, Image};
pub use crate::private::Decoder;
pub use crate::stream::{FnStream, Stream};
