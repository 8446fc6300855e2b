//! Resource store errors.

use cloudmock_core::ErrorKind;

use crate::resource::ResourceKey;

/// Errors returned by [`crate::ResourceStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No resource exists under the key.
    #[error("{0} not found")]
    NotFound(ResourceKey),

    /// A resource already exists under the key.
    #[error("{0} already exists")]
    Conflict(ResourceKey),

    /// The stored attribute blob does not decode into the requested kind.
    #[error("corrupt attributes for {key}: {source}")]
    Corrupt {
        /// The affected resource.
        key: ResourceKey,
        /// The decode failure.
        source: serde_json::Error,
    },

    /// Attributes could not be encoded.
    #[error("failed to encode attributes: {0}")]
    Encode(#[source] serde_json::Error),

    /// The sqlite backend failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classification used for wire error mapping.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Corrupt { .. } | Self::Encode(_) | Self::Database(_) => ErrorKind::Storage,
        }
    }

    /// Whether this is a [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
