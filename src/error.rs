//! Error types for txtpub operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting a text file into an EPUB.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Manifest, spine and navigation disagree. Indicates a bug, never bad input.
    #[error("inconsistent package structure: {0}")]
    Structure(String),
}

impl Error {
    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
