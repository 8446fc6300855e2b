//! S3 over path-style REST for CloudMock.
//!
//! [`S3Handler`] plugs into the gateway as its REST handler. It names every
//! S3 operation (see [`operation`]) but serves only the bucket and object
//! basics from the [`ObjectDataPlane`](cloudmock_s3_core::ObjectDataPlane);
//! the rest answer `501 NotImplemented`.

pub mod error;
mod handler;
pub mod listing;
pub mod operation;

pub use handler::{S3_NAMESPACE, S3Handler};
pub use operation::S3Operation;
