use std::collections::BTreeMap;

use cloudmock_store::ResourceKind;
use serde::{Deserialize, Serialize};

/// Stored attributes of a log group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogGroup {
    /// Group name, also the resource id.
    pub name: String,
    /// Retention set by `PutRetentionPolicy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i32>,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceKind for LogGroup {
    const SERVICE: &'static str = "logs";
    const TYPE: &'static str = "log-group";
}

/// Stored attributes of a log stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStream {
    /// Enclosing group.
    pub group: String,
    /// Stream name.
    pub name: String,
}

impl ResourceKind for LogStream {
    const SERVICE: &'static str = "logs";
    const TYPE: &'static str = "log-stream";
}
