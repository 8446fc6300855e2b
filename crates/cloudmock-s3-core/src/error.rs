//! Data-plane errors.

use std::path::PathBuf;

use cloudmock_core::ErrorKind;
use cloudmock_store::StoreError;

/// Errors produced by [`crate::ObjectDataPlane`].
#[derive(Debug, thiserror::Error)]
pub enum DataPlaneError {
    /// The bucket does not exist in the caller's namespace.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The missing bucket.
        bucket: String,
    },

    /// The object has no metadata row, or its payload file is gone.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// The bucket that was searched.
        bucket: String,
        /// The missing key.
        key: String,
    },

    /// The bucket name breaks the naming rules.
    #[error("Invalid bucket name `{name}`: {reason}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
        /// Which rule was broken.
        reason: String,
    },

    /// The object key is empty or too long.
    #[error("Invalid object key: {reason}")]
    InvalidKey {
        /// Which rule was broken.
        reason: &'static str,
    },

    /// The bucket still holds objects.
    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket that still has objects.
        bucket: String,
    },

    /// The metadata store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing a payload file failed.
    #[error("payload I/O error at {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },
}

impl DataPlaneError {
    /// Classification used for wire error mapping.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSuchBucket { .. } | Self::NoSuchKey { .. } => ErrorKind::NotFound,
            Self::InvalidBucketName { .. } | Self::InvalidKey { .. } => ErrorKind::InvalidArgument,
            Self::BucketNotEmpty { .. } => ErrorKind::Conflict,
            Self::Store(e) => e.kind(),
            Self::Io { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for data-plane operations.
pub type DataPlaneResult<T> = Result<T, DataPlaneError>;
