//! Stored attribute shapes for buckets and objects.

use chrono::{DateTime, Utc};
use cloudmock_store::ResourceKind;
use serde::{Deserialize, Serialize};

/// Bucket metadata row. The resource id is the bucket name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAttributes {
    /// Bucket name.
    pub name: String,
    /// Region reported by `GetBucketLocation`.
    pub region: String,
}

impl ResourceKind for BucketAttributes {
    const SERVICE: &'static str = "s3";
    const TYPE: &'static str = "bucket";
}

/// Object metadata row. The resource id is [`object_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    /// Owning bucket.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Quoted hex MD5 of the payload.
    pub etag: String,
    /// Detected or client-supplied content type.
    pub content_type: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Time of the last successful put.
    #[serde(rename = "created_at")]
    pub last_modified: DateTime<Utc>,
}

impl ResourceKind for ObjectAttributes {
    const SERVICE: &'static str = "s3";
    const TYPE: &'static str = "object";
}

/// Resource id of an object's metadata row.
#[must_use]
pub fn object_id(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}
