// error.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Errors encountered while decoding
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Memory for a buffer or table entry could not be reserved.
    Allocation(TryReserveError),
    /// Read callback reported failure.
    StreamRead,
    /// Move callback reported failure.
    StreamSeek,
    /// [Header](block/struct.Header.html) signature is not `GIF`.
    MalformedHeader,
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// Invalid [block](block/enum.BlockCode.html) introducer.
    InvalidBlockCode(u8),
    /// Extension label not recognized.
    InvalidExtension(u8),
    /// Second graphic control block before an image consumed the first.
    InvalidBlockSequence,
    /// [GraphicControl](block/struct.GraphicControl.html) block has invalid
    /// length or terminator.
    MalformedGraphicControlExtension,
    /// Application extension block size is not 11.
    MalformedApplicationExtension,
    /// LZW minimum code size out of range.
    InvalidCodeSize(u8),
    /// Image data does not start with a clear code.
    MissingClearCode,
    /// Image data not followed by a zero-length block terminator.
    MissingBlockTerminator,
    /// Compressed LZW data invalid or corrupt.
    InvalidLzwData,
    /// Code refers to an empty code table slot.
    UndefinedCode(u16),
    /// Code does not fit in the 12-bit code space.
    CodeOutOfRange(u16),
    /// Code table slot already populated.
    SlotOccupied(u16),
    /// Write would exceed a buffer's allocation.
    BufferOverflow,
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
}

/// Broad classification of an [Error](enum.Error.html)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad signature, version, block size or terminator.
    Format,
    /// The stream could not supply or skip the requested bytes.
    TruncatedStream,
    /// Buffer or code space bound would be exceeded.
    CapacityExceeded,
    /// Unable to obtain memory.
    AllocationFailure,
    /// Blocks or codes arrived in an invalid order.
    ProtocolViolation,
}

/// Decoding result type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the kind of error
    pub fn kind(&self) -> ErrorKind {
        use self::Error::*;
        match self {
            Io(_) | StreamRead | StreamSeek => ErrorKind::TruncatedStream,
            Allocation(_) => ErrorKind::AllocationFailure,
            MalformedHeader
            | UnsupportedVersion(_)
            | InvalidBlockCode(_)
            | InvalidExtension(_)
            | MalformedGraphicControlExtension
            | MalformedApplicationExtension
            | InvalidCodeSize(_)
            | MissingClearCode
            | MissingBlockTerminator => ErrorKind::Format,
            CodeOutOfRange(_) | SlotOccupied(_) | BufferOverflow
            | TooLargeImage => ErrorKind::CapacityExceeded,
            InvalidBlockSequence | InvalidLzwData | UndefinedCode(_) => {
                ErrorKind::ProtocolViolation
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::Allocation(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Allocation(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::Allocation(err)
    }
}
