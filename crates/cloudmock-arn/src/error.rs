//! ARN parse errors.

use cloudmock_core::ErrorKind;

/// Error returned when a string is not a valid ARN for the requested family.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// The input is not a well-formed ARN, or belongs to another family.
    #[error("invalid ARN `{arn}`: {reason}")]
    InvalidArn {
        /// The rejected input.
        arn: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl ArnError {
    pub(crate) fn invalid(arn: &str, reason: &'static str) -> Self {
        Self::InvalidArn {
            arn: arn.to_owned(),
            reason,
        }
    }

    /// Classification used for wire error mapping.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArn
    }
}

/// Convenience result type for ARN parsing.
pub type ArnResult<T> = Result<T, ArnError>;
