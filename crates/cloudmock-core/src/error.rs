//! Error types for the CloudMock core.

/// Core error type for CloudMock infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Coarse classification shared by every library error.
///
/// The gateway maps each kind onto the wire error of the protocol that
/// received the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed resource does not exist.
    NotFound,
    /// A resource with the same identity already exists, or a precondition
    /// about existing resources failed.
    Conflict,
    /// A caller-supplied value is malformed.
    InvalidArgument,
    /// A resource name could not be parsed as an ARN.
    InvalidArn,
    /// The persistence layer failed.
    Storage,
}

impl ErrorKind {
    /// Whether errors of this kind are the caller's fault.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::Storage)
    }
}
