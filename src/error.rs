use std::fmt;
use std::str::Utf8Error;

/// Unified error type for blob pool operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Synchronous acquire found no free chunk
    Exhausted,

    /// Cursor operation would cross the chunk capacity
    OutOfRange {
        position: usize,
        len: usize,
        capacity: usize,
    },

    /// Blob was released into a pool that did not issue it
    ForeignBlob,

    /// Blob lease was already returned to its pool
    Released,

    /// String length prefix below -1
    InvalidLength(i32),

    /// String payload is not valid UTF-8
    InvalidUtf8(Utf8Error),

    /// Pool construction parameters rejected
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Exhausted => write!(f, "No free chunk left in pool"),
            Error::OutOfRange {
                position,
                len,
                capacity,
            } => write!(
                f,
                "Out of range: {} bytes at position {} exceeds capacity {}",
                len, position, capacity
            ),
            Error::ForeignBlob => write!(f, "Blob belongs to a different pool"),
            Error::Released => write!(f, "Blob was already released"),
            Error::InvalidLength(len) => write!(f, "Invalid string length: {}", len),
            Error::InvalidUtf8(e) => write!(f, "Invalid UTF-8: {}", e),
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(e: Utf8Error) -> Self {
        Error::InvalidUtf8(e)
    }
}

/// Result type alias for blob pool operations
pub type Result<T> = std::result::Result<T, Error>;
