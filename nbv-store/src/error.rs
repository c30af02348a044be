//! Error type for the document store

use std::fmt;

/// Failure from the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend rejected an operation (open, transaction, commit)
    Backend(String),
    /// A record could not be encoded or decoded
    Codec(String),
}

impl StoreError {
    pub(crate) fn backend(err: impl fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "storage backend failure: {msg}"),
            StoreError::Codec(msg) => write!(f, "record serialization failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}
