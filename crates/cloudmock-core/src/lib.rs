//! Core types, configuration, and error taxonomy for CloudMock.
//!
//! This crate provides the building blocks shared by the resource store, the
//! ARN codec, the object data-plane, the protocol gateway, and every service
//! handler: tenant namespaces, caller identities, the default account and
//! region, and the environment-driven server configuration.

mod config;
mod error;
mod types;

pub use config::{CloudMockConfig, LogFormat};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use types::{AccountId, AwsRegion, Identity, Namespace, SignatureScheme};
