//! Service error type.

use thiserror::Error;

use crate::indexer::types::IndexerError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Rejected input. Nothing was changed.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error("Invalid alias pattern: {0}")]
    AliasPattern(regex::Error),

    /// Writing build output failed
    #[error("Failed to write {path}: {source}")]
    Build {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
