//! Typed view over the attribute blob.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudmock_core::Namespace;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{StoreError, StoreResult},
    resource::Resource,
    store::ResourceStore,
};

/// A kind of resource whose attributes are stored as a JSON blob.
///
/// ```
/// use cloudmock_store::ResourceKind;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Topic {
///     display_name: Option<String>,
/// }
///
/// impl ResourceKind for Topic {
///     const SERVICE: &'static str = "sns";
///     const TYPE: &'static str = "topic";
/// }
/// ```
pub trait ResourceKind: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Owning service.
    const SERVICE: &'static str;
    /// Resource type within the service.
    const TYPE: &'static str;
}

/// A resource with decoded attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResource<K> {
    /// Identifier within the kind and namespace.
    pub id: String,
    /// Tenant namespace.
    pub namespace: Namespace,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Decoded attributes.
    pub attributes: K,
}

impl<K: ResourceKind> TypedResource<K> {
    /// A new resource stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, namespace: Namespace, attributes: K) -> Self {
        Self {
            id: id.into(),
            namespace,
            created_at: Utc::now(),
            attributes,
        }
    }

    /// Encode into a generic record.
    pub fn to_resource(&self) -> StoreResult<Resource> {
        let attributes = serde_json::to_value(&self.attributes).map_err(StoreError::Encode)?;
        Ok(Resource {
            id: self.id.clone(),
            namespace: self.namespace.clone(),
            service: K::SERVICE.to_owned(),
            resource_type: K::TYPE.to_owned(),
            attributes,
            created_at: self.created_at,
        })
    }

    /// Decode a generic record. A blob that does not fit `K` is `Corrupt`.
    pub fn from_resource(resource: Resource) -> StoreResult<Self> {
        let key = resource.key();
        let attributes = serde_json::from_value(resource.attributes)
            .map_err(|source| StoreError::Corrupt { key, source })?;
        Ok(Self {
            id: resource.id,
            namespace: resource.namespace,
            created_at: resource.created_at,
            attributes,
        })
    }
}

/// What [`ResourceStoreExt::ensure_typed`] does when the resource exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Return the stored resource untouched.
    #[default]
    ShortCircuit,
    /// Replace the stored attributes with the new ones.
    Overwrite,
}

/// Outcome of an idempotent create.
#[derive(Debug, Clone, PartialEq)]
pub enum Ensured<K> {
    /// Nothing existed; the resource was inserted.
    Created(TypedResource<K>),
    /// A resource existed and was returned as-is.
    Existing(TypedResource<K>),
    /// A resource existed and its attributes were replaced.
    Overwritten(TypedResource<K>),
}

impl<K> Ensured<K> {
    /// The resource as it is now stored.
    #[must_use]
    pub fn into_inner(self) -> TypedResource<K> {
        match self {
            Self::Created(r) | Self::Existing(r) | Self::Overwritten(r) => r,
        }
    }

    /// Whether this call inserted the resource.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Typed helpers available on every [`ResourceStore`].
#[async_trait]
pub trait ResourceStoreExt: ResourceStore {
    /// Insert a new typed resource. Fails with `Conflict` if it exists.
    async fn create_typed<K: ResourceKind>(
        &self,
        resource: TypedResource<K>,
    ) -> StoreResult<TypedResource<K>> {
        self.create(resource.to_resource()?).await?;
        Ok(resource)
    }

    /// Fetch and decode one resource.
    async fn get_typed<K: ResourceKind>(
        &self,
        id: &str,
        namespace: &Namespace,
    ) -> StoreResult<TypedResource<K>> {
        let resource = self.get(id, K::SERVICE, K::TYPE, namespace).await?;
        TypedResource::from_resource(resource)
    }

    /// Like [`ResourceStoreExt::get_typed`], with absence as `None`.
    async fn find_typed<K: ResourceKind>(
        &self,
        id: &str,
        namespace: &Namespace,
    ) -> StoreResult<Option<TypedResource<K>>> {
        match self.get_typed(id, namespace).await {
            Ok(resource) => Ok(Some(resource)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All resources of kind `K` in a namespace, ordered by id.
    async fn list_typed<K: ResourceKind>(
        &self,
        namespace: &Namespace,
    ) -> StoreResult<Vec<TypedResource<K>>> {
        self.list(K::SERVICE, K::TYPE, namespace)
            .await?
            .into_iter()
            .map(TypedResource::from_resource)
            .collect()
    }

    /// Replace the attributes of an existing resource.
    async fn update_typed<K: ResourceKind>(&self, resource: &TypedResource<K>) -> StoreResult<()> {
        self.update(&resource.to_resource()?).await
    }

    /// Remove a resource of kind `K`. Absence is not an error; the flag
    /// reports whether a row was removed.
    async fn delete_typed<K: ResourceKind>(
        &self,
        id: &str,
        namespace: &Namespace,
    ) -> StoreResult<bool> {
        self.delete(id, K::SERVICE, K::TYPE, namespace).await
    }

    /// Idempotent create: get, and insert only when absent.
    ///
    /// A concurrent insert between the get and the create is absorbed by
    /// re-reading the winner and applying `policy` to it.
    async fn ensure_typed<K: ResourceKind>(
        &self,
        resource: TypedResource<K>,
        policy: CreatePolicy,
    ) -> StoreResult<Ensured<K>> {
        let existing = match self.find_typed::<K>(&resource.id, &resource.namespace).await? {
            Some(existing) => existing,
            None => match self.create_typed(resource.clone()).await {
                Ok(created) => return Ok(Ensured::Created(created)),
                Err(StoreError::Conflict(key)) => {
                    debug!(%key, "lost create race, using stored resource");
                    self.get_typed::<K>(&resource.id, &resource.namespace)
                        .await?
                }
                Err(e) => return Err(e),
            },
        };

        match policy {
            CreatePolicy::ShortCircuit => Ok(Ensured::Existing(existing)),
            CreatePolicy::Overwrite => {
                let replaced = TypedResource {
                    created_at: existing.created_at,
                    ..resource
                };
                self.update_typed(&replaced).await?;
                Ok(Ensured::Overwritten(replaced))
            }
        }
    }
}

impl<S: ResourceStore + ?Sized> ResourceStoreExt for S {}
