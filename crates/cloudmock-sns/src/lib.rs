//! SNS topics for CloudMock.
//!
//! Topics are `sns`/`topic` resources keyed by name. The handler speaks the
//! query protocol at API version `2010-03-31`; topics are addressed by ARN in
//! every action except `CreateTopic`.

mod error;
mod handler;
mod state;

pub use error::SnsError;
pub use handler::{API_VERSION, SnsHandler, XML_NAMESPACE};
pub use state::Topic;
