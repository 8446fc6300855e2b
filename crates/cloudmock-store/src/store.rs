//! The backend-agnostic store contract.

use async_trait::async_trait;
use cloudmock_core::Namespace;

use crate::{error::StoreResult, resource::Resource};

/// Persistence for [`Resource`] records.
///
/// Reads and writes are scoped by namespace: no operation ever returns or
/// modifies a resource from another namespace. Each call is atomic with
/// respect to the resource it addresses; there are no multi-resource
/// transactions.
#[async_trait]
pub trait ResourceStore: Send + Sync + std::fmt::Debug {
    /// Insert a new resource. Fails with `Conflict` if the key is taken.
    async fn create(&self, resource: Resource) -> StoreResult<Resource>;

    /// Fetch one resource. Fails with `NotFound` if absent.
    async fn get(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Resource>;

    /// Replace the attribute blob of an existing resource. The stored
    /// `created_at` is kept. Fails with `NotFound` if absent.
    async fn update(&self, resource: &Resource) -> StoreResult<()>;

    /// All resources of one type in one namespace, ordered by id.
    async fn list(
        &self,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Vec<Resource>>;

    /// Remove a resource. Succeeds whether or not a row matched; the flag
    /// reports whether one did.
    async fn delete(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<bool>;
}

/// Behaviour every backend must share, exercised from each backend's tests.
#[cfg(test)]
pub(crate) mod contract {
    use cloudmock_core::Namespace;
    use serde_json::json;

    use super::ResourceStore;
    use crate::{error::StoreError, resource::Resource};

    fn topic(id: &str, ns: &Namespace) -> Resource {
        Resource::new(id, ns.clone(), "sns", "topic", json!({ "name": id }))
    }

    pub(crate) async fn run_all(store: &dyn ResourceStore) {
        should_create_and_get(store).await;
        should_reject_duplicate_create(store).await;
        should_isolate_namespaces(store).await;
        should_isolate_types(store).await;
        should_update_attributes_only(store).await;
        should_fail_update_of_missing(store).await;
        should_delete(store).await;
        should_list_in_id_order(store).await;
    }

    async fn should_create_and_get(store: &dyn ResourceStore) {
        let ns = Namespace::new("create-get");
        let created = store.create(topic("t1", &ns)).await.unwrap();
        let fetched = store.get("t1", "sns", "topic", &ns).await.unwrap();
        assert_eq!(fetched.id, "t1");
        assert_eq!(fetched.attributes, json!({ "name": "t1" }));
        assert_eq!(
            fetched.created_at.timestamp_millis(),
            created.created_at.timestamp_millis()
        );
    }

    async fn should_reject_duplicate_create(store: &dyn ResourceStore) {
        let ns = Namespace::new("duplicate");
        store.create(topic("t1", &ns)).await.unwrap();
        let err = store.create(topic("t1", &ns)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    }

    async fn should_isolate_namespaces(store: &dyn ResourceStore) {
        let a = Namespace::new("tenant-a");
        let b = Namespace::new("tenant-b");
        store.create(topic("shared", &a)).await.unwrap();
        store.create(topic("shared", &b)).await.unwrap();

        let err = store.get("only-a", "sns", "topic", &b).await.unwrap_err();
        assert!(err.is_not_found());

        store.delete("shared", "sns", "topic", &a).await.unwrap();
        assert!(store.get("shared", "sns", "topic", &b).await.is_ok());
        assert!(store.list("sns", "topic", &a).await.unwrap().is_empty());
    }

    async fn should_isolate_types(store: &dyn ResourceStore) {
        let ns = Namespace::new("types");
        store.create(topic("x", &ns)).await.unwrap();
        store
            .create(Resource::new("x", ns.clone(), "sqs", "queue", json!({})))
            .await
            .unwrap();
        assert_eq!(store.list("sns", "topic", &ns).await.unwrap().len(), 1);
        assert_eq!(store.list("sqs", "queue", &ns).await.unwrap().len(), 1);
    }

    async fn should_update_attributes_only(store: &dyn ResourceStore) {
        let ns = Namespace::new("update");
        let created = store.create(topic("t1", &ns)).await.unwrap();

        let mut changed = created.clone();
        changed.attributes = json!({ "name": "t1", "display": "hello" });
        changed.created_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        store.update(&changed).await.unwrap();

        let fetched = store.get("t1", "sns", "topic", &ns).await.unwrap();
        assert_eq!(fetched.attributes["display"], "hello");
        assert_eq!(
            fetched.created_at.timestamp_millis(),
            created.created_at.timestamp_millis()
        );
    }

    async fn should_fail_update_of_missing(store: &dyn ResourceStore) {
        let ns = Namespace::new("update-missing");
        let err = store.update(&topic("ghost", &ns)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    async fn should_delete(store: &dyn ResourceStore) {
        let ns = Namespace::new("delete");
        store.create(topic("t1", &ns)).await.unwrap();
        assert!(store.delete("t1", "sns", "topic", &ns).await.unwrap());
        assert!(
            store
                .get("t1", "sns", "topic", &ns)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(!store.delete("t1", "sns", "topic", &ns).await.unwrap());
        assert!(!store.delete("ghost", "sns", "topic", &ns).await.unwrap());
    }

    async fn should_list_in_id_order(store: &dyn ResourceStore) {
        let ns = Namespace::new("ordering");
        for id in ["c", "a", "b"] {
            store.create(topic(id, &ns)).await.unwrap();
        }
        let ids: Vec<String> = store
            .list("sns", "topic", &ns)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
