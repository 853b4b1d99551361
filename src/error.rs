//! Error types for bit-level I/O and container coding.

use std::io;

use thiserror::Error;

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source ran out of bytes.
    #[error("unexpected end of stream")]
    EndOfStream,

    /// Container is truncated or malformed.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// A width-limited bit operation was asked for more than 8 bits.
    #[error("invalid bit width {0}: must be in range [0, 8]")]
    InvalidWidth(u8),
}

impl Error {
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Error::InvalidStructure(message.into())
    }

    /// Map a read failure, separating end of input from real faults.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::EndOfStream
        } else {
            Error::Io(err)
        }
    }

    /// Running out of input inside a region whose length was declared up
    /// front is a structural problem, not a clean end of stream.
    pub fn truncated(self, region: &str) -> Self {
        match self {
            Error::EndOfStream => {
                Error::InvalidStructure(format!("{region} is shorter than its declared length"))
            }
            other => other,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }

    /// Short machine-friendly name, handy for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io_error",
            Error::EndOfStream => "end_of_stream",
            Error::InvalidStructure(_) => "invalid_structure",
            Error::InvalidWidth(_) => "invalid_width",
        }
    }
}
