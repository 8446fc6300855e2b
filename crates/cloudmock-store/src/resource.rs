//! The stored record and its identity.

use std::fmt;

use chrono::{DateTime, Utc};
use cloudmock_core::Namespace;
use serde::{Deserialize, Serialize};

/// Composite identity of a stored resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Owning service, e.g. `sns`.
    pub service: String,
    /// Resource type within the service, e.g. `topic`.
    pub resource_type: String,
    /// Tenant namespace.
    pub namespace: Namespace,
    /// Identifier unique within the other three fields.
    pub id: String,
}

impl ResourceKey {
    /// Build a key from borrowed parts.
    #[must_use]
    pub fn new(id: &str, service: &str, resource_type: &str, namespace: &Namespace) -> Self {
        Self {
            service: service.to_owned(),
            resource_type: resource_type.to_owned(),
            namespace: namespace.clone(),
            id: id.to_owned(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} `{}` in namespace `{}`",
            self.service, self.resource_type, self.id, self.namespace
        )
    }
}

/// A control-plane record with an opaque attribute blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier unique within `(service, resource_type, namespace)`.
    pub id: String,
    /// Tenant namespace.
    pub namespace: Namespace,
    /// Owning service.
    pub service: String,
    /// Resource type within the service.
    pub resource_type: String,
    /// Service-defined attributes.
    pub attributes: serde_json::Value,
    /// Creation time, set once by the caller that creates the record.
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Create a new resource stamped with the current time.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        namespace: Namespace,
        service: impl Into<String>,
        resource_type: impl Into<String>,
        attributes: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            namespace,
            service: service.into(),
            resource_type: resource_type.into(),
            attributes,
            created_at: Utc::now(),
        }
    }

    /// The composite identity of this resource.
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.id, &self.service, &self.resource_type, &self.namespace)
    }
}
