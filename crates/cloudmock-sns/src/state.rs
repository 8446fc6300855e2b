use std::collections::BTreeMap;

use cloudmock_store::ResourceKind;
use serde::{Deserialize, Serialize};

/// Stored attributes of an SNS topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic name, also the resource id.
    pub name: String,
    /// Attributes set by `CreateTopic` or `SetTopicAttributes`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Resource tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceKind for Topic {
    const SERVICE: &'static str = "sns";
    const TYPE: &'static str = "topic";
}
