//! Protocol gateway for CloudMock.
//!
//! Every request arrives on one listener. The gateway decides which of the
//! three wire protocols it speaks, resolves the registered handler, and
//! encodes the handler's result or error back in that protocol:
//!
//! | Protocol | Recognized by | Success body | Error body |
//! |---|---|---|---|
//! | JSON target | `X-Amz-Target: Prefix.Operation` | JSON document | `{"__type", "message"}` |
//! | Query | `Action` in form body or URL | `<{Op}Response>` envelope | `<ErrorResponse>` |
//! | REST | non-empty first path segment | handler-defined | flat `<Error>` |
//!
//! A request to `/` without `Action` is a root listing and goes to the REST
//! handler as well.

pub mod auth;
pub mod body;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod protocol;
pub mod response;
pub mod service;
pub mod xml;

pub use body::ResponseBody;
pub use context::{NAMESPACE_HEADER, RequestContext};
pub use dispatch::{
    HandlerFuture, JsonHandler, QueryHandler, QueryOutput, RestHandler, RestRequest,
    ServiceRegistry,
};
pub use error::{ApiError, ProtocolFamily};
pub use params::QueryParams;
pub use protocol::{Protocol, classify};
pub use service::Gateway;
pub use xml::XmlElement;
