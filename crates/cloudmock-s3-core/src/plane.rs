//! The object data-plane.

use std::{path::PathBuf, sync::Arc};

use bytes::Bytes;
use chrono::Utc;
use cloudmock_core::{AwsRegion, Namespace};
use cloudmock_store::{
    CreatePolicy, ResourceStore, ResourceStoreExt, StoreError, TypedResource,
};
use tracing::{debug, info, warn};

use crate::{
    checksums::compute_etag,
    content::ContentStore,
    content_type::detect_content_type,
    error::{DataPlaneError, DataPlaneResult},
    state::{BucketAttributes, ObjectAttributes, object_id},
    validation::{validate_bucket_name, validate_object_key},
};

/// An object's metadata together with its payload.
#[derive(Debug, Clone)]
pub struct ObjectData {
    /// The metadata row.
    pub metadata: ObjectAttributes,
    /// The payload bytes.
    pub body: Bytes,
}

/// Buckets and objects, kept as metadata rows plus payload files.
///
/// A put writes the payload durably before the metadata row, so a reader
/// that finds the row can always read the bytes unless the file was removed
/// out of band. Concurrent puts of the same key are last-writer-wins.
#[derive(Debug, Clone)]
pub struct ObjectDataPlane {
    store: Arc<dyn ResourceStore>,
    content: ContentStore,
    region: AwsRegion,
}

impl ObjectDataPlane {
    /// A data-plane over `store` with payloads under `content_root`.
    pub fn new(store: Arc<dyn ResourceStore>, content_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            content: ContentStore::new(content_root),
            region: AwsRegion::default(),
        }
    }

    /// Region recorded on newly created buckets.
    #[must_use]
    pub fn with_region(mut self, region: AwsRegion) -> Self {
        self.region = region;
        self
    }

    /// The payload store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    /// Create a bucket. Creating an existing bucket returns it unchanged.
    pub async fn create_bucket(
        &self,
        namespace: &Namespace,
        bucket: &str,
    ) -> DataPlaneResult<TypedResource<BucketAttributes>> {
        validate_bucket_name(bucket)?;
        let resource = TypedResource::new(
            bucket,
            namespace.clone(),
            BucketAttributes {
                name: bucket.to_owned(),
                region: self.region.as_str().to_owned(),
            },
        );
        let ensured = self
            .store
            .ensure_typed(resource, CreatePolicy::ShortCircuit)
            .await?;
        if ensured.is_created() {
            info!(%namespace, bucket, "bucket created");
        }
        Ok(ensured.into_inner())
    }

    /// Fetch a bucket, failing with `NoSuchBucket`.
    pub async fn head_bucket(
        &self,
        namespace: &Namespace,
        bucket: &str,
    ) -> DataPlaneResult<TypedResource<BucketAttributes>> {
        self.store
            .find_typed::<BucketAttributes>(bucket, namespace)
            .await?
            .ok_or_else(|| DataPlaneError::NoSuchBucket {
                bucket: bucket.to_owned(),
            })
    }

    /// Delete an empty bucket. Deleting a missing bucket succeeds.
    pub async fn delete_bucket(&self, namespace: &Namespace, bucket: &str) -> DataPlaneResult<()> {
        if self
            .store
            .find_typed::<BucketAttributes>(bucket, namespace)
            .await?
            .is_none()
        {
            debug!(%namespace, bucket, "delete of missing bucket ignored");
            return Ok(());
        }
        if !self.objects_in(namespace, bucket).await?.is_empty() {
            return Err(DataPlaneError::BucketNotEmpty {
                bucket: bucket.to_owned(),
            });
        }
        self.store
            .delete_typed::<BucketAttributes>(bucket, namespace)
            .await?;
        self.content.remove_bucket(namespace, bucket).await?;
        info!(%namespace, bucket, "bucket deleted");
        Ok(())
    }

    /// All buckets in a namespace, ordered by name.
    pub async fn list_buckets(
        &self,
        namespace: &Namespace,
    ) -> DataPlaneResult<Vec<TypedResource<BucketAttributes>>> {
        Ok(self.store.list_typed::<BucketAttributes>(namespace).await?)
    }

    /// Objects of a bucket whose key starts with `prefix`, ordered by key.
    pub async fn list_objects(
        &self,
        namespace: &Namespace,
        bucket: &str,
        prefix: Option<&str>,
    ) -> DataPlaneResult<Vec<ObjectAttributes>> {
        self.head_bucket(namespace, bucket).await?;
        let prefix = prefix.unwrap_or_default();
        let mut objects: Vec<ObjectAttributes> = self
            .objects_in(namespace, bucket)
            .await?
            .into_iter()
            .filter(|o| o.key.starts_with(prefix))
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    async fn objects_in(
        &self,
        namespace: &Namespace,
        bucket: &str,
    ) -> DataPlaneResult<Vec<ObjectAttributes>> {
        Ok(self
            .store
            .list_typed::<ObjectAttributes>(namespace)
            .await?
            .into_iter()
            .map(|r| r.attributes)
            .filter(|o| o.bucket == bucket)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Store an object, replacing any previous version.
    ///
    /// The content type is `content_type` when given, otherwise detected from
    /// the key and payload.
    pub async fn put(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> DataPlaneResult<ObjectAttributes> {
        self.head_bucket(namespace, bucket).await?;
        validate_object_key(key)?;

        let attributes = ObjectAttributes {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            etag: compute_etag(&data),
            content_type: content_type
                .map_or_else(|| detect_content_type(key, &data), str::to_owned),
            size: data.len() as u64,
            last_modified: Utc::now(),
        };

        self.content.write(namespace, bucket, key, data).await?;

        let id = object_id(bucket, key);
        match self
            .store
            .find_typed::<ObjectAttributes>(&id, namespace)
            .await?
        {
            Some(mut existing) => {
                existing.attributes = attributes.clone();
                self.store.update_typed(&existing).await?;
            }
            None => {
                let resource = TypedResource::new(id, namespace.clone(), attributes.clone());
                self.store
                    .ensure_typed(resource, CreatePolicy::Overwrite)
                    .await?;
            }
        }

        debug!(%namespace, bucket, key, size = attributes.size, "object stored");
        Ok(attributes)
    }

    /// Fetch an object's metadata and payload.
    pub async fn get(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
    ) -> DataPlaneResult<ObjectData> {
        let metadata = self.metadata(namespace, bucket, key).await?;
        match self.content.read(namespace, bucket, key).await? {
            Some(body) => Ok(ObjectData { metadata, body }),
            None => {
                warn!(%namespace, bucket, key, "metadata row without payload file");
                Err(no_such_key(bucket, key))
            }
        }
    }

    /// Fetch an object's metadata without reading the payload.
    pub async fn head(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
    ) -> DataPlaneResult<ObjectAttributes> {
        let metadata = self.metadata(namespace, bucket, key).await?;
        if !self.content.exists(namespace, bucket, key).await? {
            warn!(%namespace, bucket, key, "metadata row without payload file");
            return Err(no_such_key(bucket, key));
        }
        Ok(metadata)
    }

    /// Remove an object. Removing a missing object succeeds.
    pub async fn delete(&self, namespace: &Namespace, bucket: &str, key: &str) -> DataPlaneResult<()> {
        self.head_bucket(namespace, bucket).await?;
        self.content.remove(namespace, bucket, key).await?;
        let removed = self
            .store
            .delete_typed::<ObjectAttributes>(&object_id(bucket, key), namespace)
            .await?;
        debug!(%namespace, bucket, key, removed, "object deleted");
        Ok(())
    }

    async fn metadata(
        &self,
        namespace: &Namespace,
        bucket: &str,
        key: &str,
    ) -> DataPlaneResult<ObjectAttributes> {
        self.head_bucket(namespace, bucket).await?;
        match self
            .store
            .get_typed::<ObjectAttributes>(&object_id(bucket, key), namespace)
            .await
        {
            Ok(resource) => Ok(resource.attributes),
            Err(StoreError::NotFound(_)) => Err(no_such_key(bucket, key)),
            Err(e) => Err(e.into()),
        }
    }
}

fn no_such_key(bucket: &str, key: &str) -> DataPlaneError {
    DataPlaneError::NoSuchKey {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
    }
}
