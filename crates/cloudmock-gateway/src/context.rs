//! Per-request context handed to every handler.

use cloudmock_core::{AwsRegion, Identity, Namespace};

/// Header selecting the tenant namespace.
pub const NAMESPACE_HEADER: &str = "x-cloudmock-namespace";

/// What a handler knows about the request beyond its payload.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Tenant namespace; every store access is scoped to it.
    pub namespace: Namespace,
    /// Caller identity from the `Authorization` header.
    pub identity: Identity,
    /// Id echoed in response headers and error bodies.
    pub request_id: String,
    /// Region the gateway reports.
    pub region: AwsRegion,
}

impl RequestContext {
    /// A context for the given namespace with an anonymous caller.
    #[must_use]
    pub fn new(namespace: Namespace, request_id: impl Into<String>) -> Self {
        Self {
            namespace,
            identity: Identity::Anonymous,
            request_id: request_id.into(),
            region: AwsRegion::default(),
        }
    }

    /// Replace the caller identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the reported region.
    #[must_use]
    pub fn with_region(mut self, region: AwsRegion) -> Self {
        self.region = region;
        self
    }
}
