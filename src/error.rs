//! Error types shared by every primitive in the crate

use std::fmt;
use thiserror::Error;

/// Result type for clusterkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type
///
/// Arithmetic and GCD never fail, so they have no variant here.
#[derive(Error, Debug)]
pub enum Error {
    /// An argument was absent or outside its documented range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value producer yielded no value
    #[error("Invalid result: {0}")]
    InvalidResult(String),

    /// Underlying read, write or create failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed zip container or an entry that cannot be extracted safely
    #[error("Archive error: {0}")]
    Archive(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<E: fmt::Display>(msg: E) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    /// Create an invalid result error
    pub fn invalid_result<E: fmt::Display>(msg: E) -> Self {
        Self::InvalidResult(msg.to_string())
    }

    /// Create an archive error
    pub fn archive<E: fmt::Display>(msg: E) -> Self {
        Self::Archive(msg.to_string())
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an invalid result error
    pub fn is_invalid_result(&self) -> bool {
        matches!(self, Self::InvalidResult(_))
    }

    /// Check if this error came from reading or writing bytes.
    ///
    /// Archive format errors count as I/O failures: both abort a pack or
    /// unpack without rollback.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Archive(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::archive(other),
        }
    }
}
