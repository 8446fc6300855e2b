use cloudmock_arn::ArnError;
use cloudmock_gateway::ApiError;
use cloudmock_store::StoreError;

/// Errors returned by logs operations.
#[derive(Debug, thiserror::Error)]
pub enum LogsError {
    /// The request body does not match the operation's input.
    #[error("{0}")]
    Serialization(String),

    /// A parameter is missing or out of range.
    #[error("{0}")]
    InvalidParameter(String),

    /// The group or stream does not exist.
    #[error("The specified {0} does not exist.")]
    ResourceNotFound(&'static str),

    /// The group or stream already exists.
    #[error("The specified {0} already exists")]
    ResourceAlreadyExists(&'static str),

    /// A resource ARN could not be parsed.
    #[error(transparent)]
    Arn(#[from] ArnError),

    /// The resource store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LogsError> for ApiError {
    fn from(err: LogsError) -> Self {
        match err {
            LogsError::Serialization(message) => ApiError::serialization(message),
            LogsError::InvalidParameter(_) | LogsError::Arn(_) => {
                ApiError::bad_request("InvalidParameterException", err.to_string())
            }
            LogsError::ResourceNotFound(_) => {
                ApiError::bad_request("ResourceNotFoundException", err.to_string())
            }
            LogsError::ResourceAlreadyExists(_) => {
                ApiError::bad_request("ResourceAlreadyExistsException", err.to_string())
            }
            LogsError::Store(e) => e.into(),
        }
    }
}
