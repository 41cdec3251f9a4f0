//! Error types for LZFSE decoding.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while decoding a stream.
///
/// Every variant except [`Error::Usage`] is terminal for the reader that produced it:
/// after a fault, later reads return [`Error::Poisoned`].
#[derive(Debug, Error)]
pub enum Error {
    /// A block started with a magic number that isn't one of the five known ones.
    #[error("unknown block magic 0x{0:08x}")]
    BadMagic(u32),

    /// The stream is structurally invalid.
    #[error("malformed stream: {0}")]
    Format(&'static str),

    /// The source ended before a mandatory read completed.
    #[error("stream truncated")]
    Truncated,

    /// The caller passed invalid arguments or configuration.
    #[error("invalid usage: {0}")]
    Usage(&'static str),

    /// The underlying source failed.
    #[error("io error: {0}")]
    Io(io::Error),

    /// A previous call already faulted, the stream can't be resumed.
    #[error("stream previously faulted")]
    Poisoned,
}

/// A specialized Result type for LZFSE operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::Io(inner) => return inner,
            Error::BadMagic(_) | Error::Format(_) => io::ErrorKind::InvalidData,
            Error::Truncated => io::ErrorKind::UnexpectedEof,
            Error::Usage(_) => io::ErrorKind::InvalidInput,
            Error::Poisoned => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
