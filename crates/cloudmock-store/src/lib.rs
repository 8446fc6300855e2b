//! Generic resource store for CloudMock.
//!
//! Every control-plane resource (a topic, a log group, a bucket, an object's
//! metadata row) is persisted as a [`Resource`]: an opaque JSON attribute blob
//! addressed by `(service, resource_type, namespace, id)`. Two backends
//! implement [`ResourceStore`]:
//!
//! - [`MemoryResourceStore`]: a `DashMap`, used when persistence is disabled.
//! - [`SqliteResourceStore`]: a single sqlite table, used when persistence is
//!   enabled.
//!
//! Handlers work through the typed layer in [`ResourceStoreExt`], which
//! converts between the blob and a per-kind attribute struct.

mod error;
mod memory;
mod resource;
mod sqlite;
mod store;
mod typed;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryResourceStore;
pub use resource::{Resource, ResourceKey};
pub use sqlite::SqliteResourceStore;
pub use store::ResourceStore;
pub use typed::{CreatePolicy, Ensured, ResourceKind, ResourceStoreExt, TypedResource};
