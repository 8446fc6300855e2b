//! Data-plane errors as S3 wire errors.

use cloudmock_gateway::ApiError;
use cloudmock_s3_core::DataPlaneError;
use http::StatusCode;
use tracing::error;

/// Map a data-plane error onto the S3 error code vocabulary.
#[must_use]
pub fn s3_error(err: &DataPlaneError) -> ApiError {
    let message = err.to_string();
    match err {
        DataPlaneError::NoSuchBucket { bucket } => {
            ApiError::not_found("NoSuchBucket", message).with_resource(format!("/{bucket}"))
        }
        DataPlaneError::NoSuchKey { bucket, key } => {
            ApiError::not_found("NoSuchKey", message).with_resource(format!("/{bucket}/{key}"))
        }
        DataPlaneError::InvalidBucketName { name, .. } => {
            ApiError::bad_request("InvalidBucketName", message).with_resource(format!("/{name}"))
        }
        DataPlaneError::InvalidKey { .. } => ApiError::bad_request("KeyTooLongError", message),
        DataPlaneError::BucketNotEmpty { bucket } => {
            ApiError::new("BucketNotEmpty", StatusCode::CONFLICT, message)
                .with_resource(format!("/{bucket}"))
        }
        DataPlaneError::Store(_) | DataPlaneError::Io { .. } => {
            error!(error = %err, "data-plane failure");
            ApiError::new(
                "InternalError",
                StatusCode::INTERNAL_SERVER_ERROR,
                "We encountered an internal error. Please try again.",
            )
        }
    }
}
