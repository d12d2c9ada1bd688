//! Indexer type definitions.

use thiserror::Error;

use crate::input::source::SourceError;

#[derive(Error, Debug)]
pub enum IndexerError {
    /// A configured source path is neither a file nor a directory
    #[error("Source path does not exist: {0}")]
    InvalidPath(String),
    /// Error when failing to read a file
    #[error("Failed to read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a localisation file
    #[error("{path}: {source}")]
    Source {
        path: String,
        #[source]
        source: SourceError,
    },
    /// Other generic error
    #[error("An error occurred: {0}")]
    Error(String),
}
