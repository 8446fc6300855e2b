//! CloudWatch Logs control-plane for CloudMock.
//!
//! Log groups (`logs`/`log-group`, id = group name) and log streams
//! (`logs`/`log-stream`, id = stream ARN) live in the resource store. The
//! handler answers `X-Amz-Target: Logs_20140328.{Operation}` requests.
//! Tagging addresses groups by ARN, with or without the trailing `:*`.

mod error;
mod handler;
pub mod model;
mod state;

pub use error::LogsError;
pub use handler::{LogsHandler, TARGET_PREFIX};
pub use state::{LogGroup, LogStream};
