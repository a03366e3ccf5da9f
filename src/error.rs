//! Error types for the form-data crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the form-data crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The field set is malformed, e.g. a reserved file field holding a scalar.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A file named by a file field could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        /// The offending path, as given by the caller.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Media type error
    #[error("Media type error: {0}")]
    MediaType(String),

    /// Multipart error
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// Message too large
    #[error("Message too large")]
    MessageTooLarge,
}

/// Specialized Result type for form-data operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileRead {
            path: path.into(),
            source,
        }
    }
}
