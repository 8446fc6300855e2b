//! In-memory backend.

use async_trait::async_trait;
use cloudmock_core::Namespace;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    error::{StoreError, StoreResult},
    resource::{Resource, ResourceKey},
    store::ResourceStore,
};

/// Resource store backed by a concurrent hash map. Contents are lost when the
/// process exits.
///
/// # Examples
///
/// ```
/// use cloudmock_core::Namespace;
/// use cloudmock_store::{MemoryResourceStore, Resource, ResourceStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryResourceStore::new();
/// let ns = Namespace::new("tenant-a");
/// store
///     .create(Resource::new("t1", ns.clone(), "sns", "topic", serde_json::json!({})))
///     .await
///     .unwrap();
/// assert_eq!(store.list("sns", "topic", &ns).await.unwrap().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    inner: DashMap<ResourceKey, Resource>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn create(&self, resource: Resource) -> StoreResult<Resource> {
        match self.inner.entry(resource.key()) {
            Entry::Occupied(entry) => Err(StoreError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(resource.clone());
                Ok(resource)
            }
        }
    }

    async fn get(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Resource> {
        let key = ResourceKey::new(id, service, resource_type, namespace);
        self.inner
            .get(&key)
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound(key))
    }

    async fn update(&self, resource: &Resource) -> StoreResult<()> {
        let key = resource.key();
        match self.inner.get_mut(&key) {
            Some(mut stored) => {
                stored.attributes = resource.attributes.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(key)),
        }
    }

    async fn list(
        &self,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .inner
            .iter()
            .filter(|entry| {
                let key = entry.key();
                key.service == service
                    && key.resource_type == resource_type
                    && &key.namespace == namespace
            })
            .map(|entry| entry.value().clone())
            .collect();
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }

    async fn delete(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<bool> {
        let key = ResourceKey::new(id, service, resource_type, namespace);
        Ok(self.inner.remove(&key).is_some())
    }
}
