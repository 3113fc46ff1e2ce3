//! Errors raised by the locator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while constructing or iterating a locator.
#[derive(Error, Debug)]
pub enum LocatorError {
    /// The root is neither an existing directory nor a usable entry sequence.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A directory could not be walked or a file could not be read.
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LocatorError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LocatorError::InvalidArgument(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LocatorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error was raised while building the locator.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, LocatorError::InvalidArgument(_))
    }
}
