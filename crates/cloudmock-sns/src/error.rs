use cloudmock_arn::ArnError;
use cloudmock_gateway::ApiError;
use cloudmock_store::StoreError;
use http::StatusCode;

/// Errors returned by SNS actions.
#[derive(Debug, thiserror::Error)]
pub enum SnsError {
    /// A required parameter is missing or malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The topic named by an ARN does not exist.
    #[error("Topic does not exist")]
    TopicNotFound,

    /// A tagging action addressed a missing resource.
    #[error("Resource does not exist")]
    ResourceNotFound,

    /// The ARN could not be parsed.
    #[error(transparent)]
    Arn(#[from] ArnError),

    /// The resource store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SnsError> for ApiError {
    fn from(err: SnsError) -> Self {
        match err {
            SnsError::InvalidParameter(_) => ApiError::bad_request("InvalidParameter", err.to_string()),
            SnsError::Arn(e) => {
                ApiError::bad_request("InvalidParameter", format!("Invalid parameter: {e}"))
            }
            SnsError::TopicNotFound => ApiError::new("NotFound", StatusCode::NOT_FOUND, err.to_string()),
            SnsError::ResourceNotFound => {
                ApiError::new("ResourceNotFound", StatusCode::NOT_FOUND, err.to_string())
            }
            SnsError::Store(e) => e.into(),
        }
    }
}
