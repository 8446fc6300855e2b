//! Wire-level API errors.

use std::{borrow::Cow, fmt};

use cloudmock_arn::ArnError;
use cloudmock_core::ErrorKind;
use cloudmock_store::StoreError;
use http::StatusCode;
use tracing::error;

/// The protocol family whose error envelope an error is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// Header-targeted JSON.
    Json,
    /// Form/query with XML envelopes.
    Query,
    /// Path-addressed REST with flat XML errors.
    Rest,
}

/// An error as it appears on the wire: an error code, a status, and a message.
///
/// The encoder for the request's protocol decides the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code, e.g. `ResourceNotFoundException` or `NoSuchBucket`.
    pub code: Cow<'static, str>,
    /// HTTP status.
    pub status: StatusCode,
    /// Human readable message.
    pub message: String,
    /// Resource the error refers to (REST errors only).
    pub resource: Option<String>,
}

impl ApiError {
    /// A new error.
    #[must_use]
    pub fn new(
        code: impl Into<Cow<'static, str>>,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            status,
            message: message.into(),
            resource: None,
        }
    }

    /// A `400 Bad Request` error.
    #[must_use]
    pub fn bad_request(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(code, StatusCode::BAD_REQUEST, message)
    }

    /// A `404 Not Found` error.
    #[must_use]
    pub fn not_found(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(code, StatusCode::NOT_FOUND, message)
    }

    /// A `500` error with the generic `InternalFailure` code.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            "InternalFailure",
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
        )
    }

    /// A `501` error for operations that are recognized but not emulated.
    #[must_use]
    pub fn not_implemented(operation: &str) -> Self {
        Self::new(
            "NotImplemented",
            StatusCode::NOT_IMPLEMENTED,
            format!("The operation {operation} is not supported by this emulator"),
        )
    }

    /// The JSON target names no registered handler or operation.
    #[must_use]
    pub fn unknown_json_operation(target: &str) -> Self {
        Self::bad_request(
            "UnknownOperationException",
            format!("Unknown operation {target}"),
        )
    }

    /// No query handler accepts the action.
    #[must_use]
    pub fn invalid_action(action: &str) -> Self {
        Self::bad_request(
            "InvalidAction",
            format!("The action {action} is not valid for this endpoint."),
        )
    }

    /// No REST handler is registered for the request.
    #[must_use]
    pub fn unknown_rest_operation(path: &str) -> Self {
        Self::not_found(
            "UnknownOperation",
            format!("No service handles the path {path}"),
        )
    }

    /// A JSON body that does not match the operation's input shape.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::bad_request("SerializationException", message)
    }

    /// Map a classified library error onto a generic wire error.
    #[must_use]
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        match kind {
            ErrorKind::NotFound => Self::bad_request("ResourceNotFoundException", message),
            ErrorKind::Conflict => Self::bad_request("ResourceAlreadyExistsException", message),
            ErrorKind::InvalidArgument | ErrorKind::InvalidArn => {
                Self::bad_request("ValidationException", message)
            }
            ErrorKind::Storage => Self::internal(message),
        }
    }

    /// Attach the resource the error refers to.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether the caller is at fault (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Storage {
            error!(error = %err, "resource store failure");
        }
        Self::from_kind(kind, err.to_string())
    }
}

impl From<ArnError> for ApiError {
    fn from(err: ArnError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}
