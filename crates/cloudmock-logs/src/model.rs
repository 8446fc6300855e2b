//! Logs input and output shapes.
//!
//! Field names are `camelCase` on the wire. Optional outputs are omitted when
//! `None`; unknown input fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log groups
// ---------------------------------------------------------------------------

/// Input for `CreateLogGroup`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogGroupInput {
    /// Name of the new group.
    pub log_group_name: String,
    /// Tags to attach.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Input naming a single log group (`DeleteLogGroup`, `DeleteRetentionPolicy`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupNameInput {
    /// The group.
    pub log_group_name: String,
}

/// Input for `DescribeLogGroups`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogGroupsInput {
    /// Only groups whose name starts with this.
    pub log_group_name_prefix: Option<String>,
    /// Page size, 1 to 50.
    pub limit: Option<i64>,
    /// Token from a previous page.
    pub next_token: Option<String>,
}

/// One entry of `DescribeLogGroups`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupDescription {
    /// Group name.
    pub log_group_name: String,
    /// Creation time in epoch milliseconds.
    pub creation_time: i64,
    /// Retention, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i32>,
    /// Always zero.
    pub metric_filter_count: i64,
    /// Group ARN with the trailing `:*`.
    pub arn: String,
    /// Group ARN without wildcard.
    pub log_group_arn: String,
    /// Always zero; events are not stored.
    pub stored_bytes: i64,
}

/// Output of `DescribeLogGroups`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogGroupsOutput {
    /// Groups on this page, sorted by name.
    pub log_groups: Vec<LogGroupDescription>,
    /// Present when more groups follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Input for `PutRetentionPolicy`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRetentionPolicyInput {
    /// The group.
    pub log_group_name: String,
    /// Retention in days; must be one of the values AWS accepts.
    pub retention_in_days: i32,
}

// ---------------------------------------------------------------------------
// Log streams
// ---------------------------------------------------------------------------

/// Input naming one stream (`CreateLogStream`, `DeleteLogStream`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStreamInput {
    /// Enclosing group.
    pub log_group_name: String,
    /// The stream.
    pub log_stream_name: String,
}

/// Input for `DescribeLogStreams`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogStreamsInput {
    /// Enclosing group by name.
    pub log_group_name: Option<String>,
    /// Enclosing group by name or ARN.
    pub log_group_identifier: Option<String>,
    /// Only streams whose name starts with this.
    pub log_stream_name_prefix: Option<String>,
    /// Reverse the order.
    #[serde(default)]
    pub descending: bool,
    /// Page size, 1 to 50.
    pub limit: Option<i64>,
    /// Token from a previous page.
    pub next_token: Option<String>,
}

/// One entry of `DescribeLogStreams`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStreamDescription {
    /// Stream name.
    pub log_stream_name: String,
    /// Creation time in epoch milliseconds.
    pub creation_time: i64,
    /// Stream ARN.
    pub arn: String,
    /// Always zero; events are not stored.
    pub stored_bytes: i64,
}

/// Output of `DescribeLogStreams`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogStreamsOutput {
    /// Streams on this page.
    pub log_streams: Vec<LogStreamDescription>,
    /// Present when more streams follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Tagging
// ---------------------------------------------------------------------------

/// Input for `TagResource`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResourceInput {
    /// Log group ARN.
    pub resource_arn: String,
    /// Tags to add or replace.
    pub tags: BTreeMap<String, String>,
}

/// Input for `UntagResource`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntagResourceInput {
    /// Log group ARN.
    pub resource_arn: String,
    /// Keys to remove.
    pub tag_keys: Vec<String>,
}

/// Input for `ListTagsForResource`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTagsForResourceInput {
    /// Log group ARN.
    pub resource_arn: String,
}

/// Output of `ListTagsForResource`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTagsForResourceOutput {
    /// Current tags.
    pub tags: BTreeMap<String, String>,
}
