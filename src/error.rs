use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GramstatError>;

/// Errors surfaced by the statistics pass, the vocabulary store and the extractors.
#[derive(Debug, Error)]
pub enum GramstatError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: Cow<'static, str> },

    #[error("Failed to load word list {path}: {reason}")]
    WordList {
        path: PathBuf,
        reason: Cow<'static, str>,
    },

    #[error("Field `{field}` is already registered")]
    DuplicateField { field: String },

    #[error("Vocabulary store is sealed; the statistics pass cannot write to it")]
    StoreSealed,

    #[error("Vocabulary store is not sealed; finish the statistics pass before reading vocabularies")]
    StoreNotSealed,

    #[error("Invalid store file: {reason}")]
    InvalidStoreFile { reason: Cow<'static, str> },

    #[error("Document has no target span")]
    MissingTarget,

    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: Cow<'static, str> },
}

impl GramstatError {
    /// Errors that only concern one corpus instance; batch helpers record these and keep going.
    #[must_use]
    pub fn is_instance_error(&self) -> bool {
        matches!(self, Self::MissingTarget | Self::MalformedDocument { .. })
    }

    pub(crate) fn config(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }
}
