//! Sqlite backend.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudmock_core::Namespace;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info};

use crate::{
    error::{StoreError, StoreResult},
    resource::{Resource, ResourceKey},
    store::ResourceStore,
};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS resources (
    service       TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    namespace     TEXT NOT NULL,
    id            TEXT NOT NULL,
    attributes    TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (service, resource_type, namespace, id)
)";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, FromRow)]
struct ResourceRow {
    service: String,
    resource_type: String,
    namespace: String,
    id: String,
    attributes: String,
    created_at: DateTime<Utc>,
}

impl ResourceRow {
    fn into_resource(self) -> StoreResult<Resource> {
        let namespace = Namespace::new(self.namespace);
        let attributes = serde_json::from_str(&self.attributes).map_err(|source| {
            StoreError::Corrupt {
                key: ResourceKey::new(&self.id, &self.service, &self.resource_type, &namespace),
                source,
            }
        })?;
        Ok(Resource {
            id: self.id,
            namespace,
            service: self.service,
            resource_type: self.resource_type,
            attributes,
            created_at: self.created_at,
        })
    }
}

/// Resource store persisted in one sqlite table keyed by
/// `(service, resource_type, namespace, id)`.
#[derive(Debug, Clone)]
pub struct SqliteResourceStore {
    pool: SqlitePool,
}

impl SqliteResourceStore {
    /// Open (creating if missing) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        info!(url, "opened sqlite resource store");
        Self::from_pool(pool).await
    }

    /// A private in-memory database. Data lives as long as the store.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A memory database vanishes with its connection, so pin exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the table if needed.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        debug!("resource schema ready");
        Ok(Self { pool })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ResourceStore for SqliteResourceStore {
    async fn create(&self, resource: Resource) -> StoreResult<Resource> {
        let attributes = serde_json::to_string(&resource.attributes).map_err(StoreError::Encode)?;
        let result = sqlx::query(
            "INSERT INTO resources (service, resource_type, namespace, id, attributes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(resource.service.as_str())
        .bind(resource.resource_type.as_str())
        .bind(resource.namespace.as_str())
        .bind(resource.id.as_str())
        .bind(attributes)
        .bind(resource.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(resource),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict(resource.key()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Resource> {
        let row = sqlx::query_as::<_, ResourceRow>(
            "SELECT service, resource_type, namespace, id, attributes, created_at \
             FROM resources \
             WHERE service = ? AND resource_type = ? AND namespace = ? AND id = ?",
        )
        .bind(service)
        .bind(resource_type)
        .bind(namespace.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_resource(),
            None => Err(StoreError::NotFound(ResourceKey::new(
                id,
                service,
                resource_type,
                namespace,
            ))),
        }
    }

    async fn update(&self, resource: &Resource) -> StoreResult<()> {
        let attributes = serde_json::to_string(&resource.attributes).map_err(StoreError::Encode)?;
        let result = sqlx::query(
            "UPDATE resources SET attributes = ? \
             WHERE service = ? AND resource_type = ? AND namespace = ? AND id = ?",
        )
        .bind(attributes)
        .bind(resource.service.as_str())
        .bind(resource.resource_type.as_str())
        .bind(resource.namespace.as_str())
        .bind(resource.id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(resource.key()));
        }
        Ok(())
    }

    async fn list(
        &self,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(
            "SELECT service, resource_type, namespace, id, attributes, created_at \
             FROM resources \
             WHERE service = ? AND resource_type = ? AND namespace = ? \
             ORDER BY id",
        )
        .bind(service)
        .bind(resource_type)
        .bind(namespace.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResourceRow::into_resource).collect()
    }

    async fn delete(
        &self,
        id: &str,
        service: &str,
        resource_type: &str,
        namespace: &Namespace,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM resources \
             WHERE service = ? AND resource_type = ? AND namespace = ? AND id = ?",
        )
        .bind(service)
        .bind(resource_type)
        .bind(namespace.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
