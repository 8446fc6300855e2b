use std::{str::FromStr, sync::Arc};

use bytes::Bytes;
use cloudmock_arn::{LogGroupArn, LogsArn};
use cloudmock_core::{AccountId, Namespace};
use cloudmock_gateway::{ApiError, HandlerFuture, JsonHandler, RequestContext};
use cloudmock_store::{ResourceStore, ResourceStoreExt, StoreError, TypedResource};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::info;

use crate::{
    error::LogsError,
    model::{
        CreateLogGroupInput, DescribeLogGroupsInput, DescribeLogGroupsOutput,
        DescribeLogStreamsInput, DescribeLogStreamsOutput, ListTagsForResourceInput,
        ListTagsForResourceOutput, LogGroupDescription, LogGroupNameInput, LogStreamDescription,
        LogStreamInput, PutRetentionPolicyInput, TagResourceInput, UntagResourceInput,
    },
    state::{LogGroup, LogStream},
};

/// `X-Amz-Target` prefix of the logs API.
pub const TARGET_PREFIX: &str = "Logs_20140328";

const OPERATIONS: &[&str] = &[
    "CreateLogGroup",
    "DeleteLogGroup",
    "DescribeLogGroups",
    "PutRetentionPolicy",
    "DeleteRetentionPolicy",
    "CreateLogStream",
    "DeleteLogStream",
    "DescribeLogStreams",
    "TagResource",
    "UntagResource",
    "ListTagsForResource",
];

/// Retention periods AWS accepts.
const RETENTION_DAYS: &[i32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

const MAX_PAGE: usize = 50;

const LOG_GROUP: &str = "log group";
const LOG_STREAM: &str = "log stream";

type LogsResult<T> = Result<T, LogsError>;

/// CloudWatch Logs operations backed by the resource store.
#[derive(Debug, Clone)]
pub struct LogsHandler {
    store: Arc<dyn ResourceStore>,
}

impl LogsHandler {
    /// A handler over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    async fn dispatch(&self, ctx: &RequestContext, operation: &str, body: &[u8]) -> LogsResult<Value> {
        match operation {
            "CreateLogGroup" => {
                self.create_log_group(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "DeleteLogGroup" => {
                self.delete_log_group(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "DescribeLogGroups" => to_json(&self.describe_log_groups(ctx, parse(body)?).await?),
            "PutRetentionPolicy" => {
                self.put_retention_policy(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "DeleteRetentionPolicy" => {
                self.delete_retention_policy(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "CreateLogStream" => {
                self.create_log_stream(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "DeleteLogStream" => {
                self.delete_log_stream(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "DescribeLogStreams" => to_json(&self.describe_log_streams(ctx, parse(body)?).await?),
            "TagResource" => {
                self.tag_resource(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "UntagResource" => {
                self.untag_resource(ctx, parse(body)?).await?;
                Ok(empty())
            }
            "ListTagsForResource" => {
                to_json(&self.list_tags_for_resource(ctx, parse(body)?).await?)
            }
            other => Err(LogsError::InvalidParameter(format!(
                "Unsupported operation {other}"
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Log groups
    // -----------------------------------------------------------------------

    async fn create_log_group(
        &self,
        ctx: &RequestContext,
        input: CreateLogGroupInput,
    ) -> LogsResult<()> {
        validate_group_name(&input.log_group_name)?;
        let group = LogGroup {
            name: input.log_group_name.clone(),
            retention_in_days: None,
            tags: input.tags,
        };
        let resource = TypedResource::new(&input.log_group_name, ctx.namespace.clone(), group);
        match self.store.create_typed(resource).await {
            Ok(_) => {
                info!(namespace = %ctx.namespace, group = %input.log_group_name, "log group created");
                Ok(())
            }
            Err(StoreError::Conflict(_)) => Err(LogsError::ResourceAlreadyExists(LOG_GROUP)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_log_group(
        &self,
        ctx: &RequestContext,
        input: LogGroupNameInput,
    ) -> LogsResult<()> {
        let ns = &ctx.namespace;
        let removed = self
            .store
            .delete_typed::<LogGroup>(&input.log_group_name, ns)
            .await?;
        for stream in self.streams_of(ns, &input.log_group_name).await? {
            self.store.delete_typed::<LogStream>(&stream.id, ns).await?;
        }
        if removed {
            info!(namespace = %ns, group = %input.log_group_name, "log group deleted");
        }
        Ok(())
    }

    async fn describe_log_groups(
        &self,
        ctx: &RequestContext,
        input: DescribeLogGroupsInput,
    ) -> LogsResult<DescribeLogGroupsOutput> {
        let limit = parse_limit(input.limit)?;
        let offset = parse_token(input.next_token.as_deref())?;
        let prefix = input.log_group_name_prefix.unwrap_or_default();

        let groups: Vec<TypedResource<LogGroup>> = self
            .store
            .list_typed::<LogGroup>(&ctx.namespace)
            .await?
            .into_iter()
            .filter(|g| g.attributes.name.starts_with(&prefix))
            .collect();
        let (groups, next_token) = paginate(groups, offset, limit);

        let log_groups = groups
            .into_iter()
            .map(|g| {
                let arn = group_arn(ctx, &g.attributes.name);
                LogGroupDescription {
                    creation_time: g.created_at.timestamp_millis(),
                    retention_in_days: g.attributes.retention_in_days,
                    metric_filter_count: 0,
                    arn: arn.clone().with_wildcard(true).to_string(),
                    log_group_arn: arn.to_string(),
                    stored_bytes: 0,
                    log_group_name: g.attributes.name,
                }
            })
            .collect();
        Ok(DescribeLogGroupsOutput {
            log_groups,
            next_token,
        })
    }

    async fn put_retention_policy(
        &self,
        ctx: &RequestContext,
        input: PutRetentionPolicyInput,
    ) -> LogsResult<()> {
        if !RETENTION_DAYS.contains(&input.retention_in_days) {
            return Err(LogsError::InvalidParameter(format!(
                "1 validation error detected: Value '{}' at 'retentionInDays' failed to satisfy constraint: Member must satisfy enum value set",
                input.retention_in_days
            )));
        }
        let mut group = self.group(&ctx.namespace, &input.log_group_name).await?;
        group.attributes.retention_in_days = Some(input.retention_in_days);
        self.store.update_typed(&group).await?;
        Ok(())
    }

    async fn delete_retention_policy(
        &self,
        ctx: &RequestContext,
        input: LogGroupNameInput,
    ) -> LogsResult<()> {
        let mut group = self.group(&ctx.namespace, &input.log_group_name).await?;
        group.attributes.retention_in_days = None;
        self.store.update_typed(&group).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Log streams
    // -----------------------------------------------------------------------

    async fn create_log_stream(
        &self,
        ctx: &RequestContext,
        input: LogStreamInput,
    ) -> LogsResult<()> {
        validate_stream_name(&input.log_stream_name)?;
        self.group(&ctx.namespace, &input.log_group_name).await?;

        let id = group_arn(ctx, &input.log_group_name)
            .stream(&input.log_stream_name)
            .to_string();
        let stream = LogStream {
            group: input.log_group_name,
            name: input.log_stream_name,
        };
        match self
            .store
            .create_typed(TypedResource::new(id, ctx.namespace.clone(), stream))
            .await
        {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict(_)) => Err(LogsError::ResourceAlreadyExists(LOG_STREAM)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_log_stream(
        &self,
        ctx: &RequestContext,
        input: LogStreamInput,
    ) -> LogsResult<()> {
        self.group(&ctx.namespace, &input.log_group_name).await?;
        let id = group_arn(ctx, &input.log_group_name)
            .stream(&input.log_stream_name)
            .to_string();
        self.store
            .delete_typed::<LogStream>(&id, &ctx.namespace)
            .await?;
        Ok(())
    }

    async fn describe_log_streams(
        &self,
        ctx: &RequestContext,
        input: DescribeLogStreamsInput,
    ) -> LogsResult<DescribeLogStreamsOutput> {
        let limit = parse_limit(input.limit)?;
        let offset = parse_token(input.next_token.as_deref())?;
        let group_name = match (input.log_group_name, input.log_group_identifier) {
            (Some(name), _) => name,
            (None, Some(identifier)) if identifier.starts_with("arn:") => {
                LogGroupArn::from_str(&identifier)?.name
            }
            (None, Some(identifier)) => identifier,
            (None, None) => {
                return Err(LogsError::InvalidParameter(
                    "Either logGroupName or logGroupIdentifier is required".to_owned(),
                ));
            }
        };
        self.group(&ctx.namespace, &group_name).await?;

        let prefix = input.log_stream_name_prefix.unwrap_or_default();
        let mut streams: Vec<TypedResource<LogStream>> = self
            .streams_of(&ctx.namespace, &group_name)
            .await?
            .into_iter()
            .filter(|s| s.attributes.name.starts_with(&prefix))
            .collect();
        streams.sort_by(|a, b| a.attributes.name.cmp(&b.attributes.name));
        if input.descending {
            streams.reverse();
        }
        let (streams, next_token) = paginate(streams, offset, limit);

        let log_streams = streams
            .into_iter()
            .map(|s| LogStreamDescription {
                creation_time: s.created_at.timestamp_millis(),
                arn: s.id,
                stored_bytes: 0,
                log_stream_name: s.attributes.name,
            })
            .collect();
        Ok(DescribeLogStreamsOutput {
            log_streams,
            next_token,
        })
    }

    // -----------------------------------------------------------------------
    // Tagging
    // -----------------------------------------------------------------------

    async fn tag_resource(&self, ctx: &RequestContext, input: TagResourceInput) -> LogsResult<()> {
        let mut group = self.tagged_group(ctx, &input.resource_arn).await?;
        group.attributes.tags.extend(input.tags);
        self.store.update_typed(&group).await?;
        Ok(())
    }

    async fn untag_resource(
        &self,
        ctx: &RequestContext,
        input: UntagResourceInput,
    ) -> LogsResult<()> {
        let mut group = self.tagged_group(ctx, &input.resource_arn).await?;
        for key in &input.tag_keys {
            group.attributes.tags.remove(key);
        }
        self.store.update_typed(&group).await?;
        Ok(())
    }

    async fn list_tags_for_resource(
        &self,
        ctx: &RequestContext,
        input: ListTagsForResourceInput,
    ) -> LogsResult<ListTagsForResourceOutput> {
        let group = self.tagged_group(ctx, &input.resource_arn).await?;
        Ok(ListTagsForResourceOutput {
            tags: group.attributes.tags,
        })
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    async fn group(&self, ns: &Namespace, name: &str) -> LogsResult<TypedResource<LogGroup>> {
        self.store
            .find_typed::<LogGroup>(name, ns)
            .await?
            .ok_or(LogsError::ResourceNotFound(LOG_GROUP))
    }

    async fn streams_of(
        &self,
        ns: &Namespace,
        group: &str,
    ) -> LogsResult<Vec<TypedResource<LogStream>>> {
        Ok(self
            .store
            .list_typed::<LogStream>(ns)
            .await?
            .into_iter()
            .filter(|s| s.attributes.group == group)
            .collect())
    }

    /// Resolve a taggable resource ARN. Only log groups carry tags.
    async fn tagged_group(
        &self,
        ctx: &RequestContext,
        resource_arn: &str,
    ) -> LogsResult<TypedResource<LogGroup>> {
        match LogsArn::from_str(resource_arn)? {
            LogsArn::Group(arn) => self.group(&ctx.namespace, &arn.name).await,
            LogsArn::Stream(_) => Err(LogsError::InvalidParameter(format!(
                "{resource_arn} is not a taggable resource"
            ))),
        }
    }
}

impl JsonHandler for LogsHandler {
    fn service_name(&self) -> &'static str {
        "logs"
    }

    fn target_prefix(&self) -> &'static str {
        TARGET_PREFIX
    }

    fn supports(&self, operation: &str) -> bool {
        OPERATIONS.contains(&operation)
    }

    fn handle(
        &self,
        ctx: RequestContext,
        operation: String,
        body: Bytes,
    ) -> HandlerFuture<Value> {
        let handler = self.clone();
        Box::pin(async move {
            handler
                .dispatch(&ctx, &operation, &body)
                .await
                .map_err(ApiError::from)
        })
    }
}

fn group_arn(ctx: &RequestContext, name: &str) -> LogGroupArn {
    LogGroupArn::with_location(ctx.region.as_str(), AccountId::DEFAULT, name)
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> LogsResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| LogsError::Serialization(e.to_string()))
}

fn to_json<T: Serialize>(output: &T) -> LogsResult<Value> {
    serde_json::to_value(output).map_err(|e| LogsError::Serialization(e.to_string()))
}

fn empty() -> Value {
    Value::Object(serde_json::Map::new())
}

fn parse_limit(limit: Option<i64>) -> LogsResult<usize> {
    match limit {
        None => Ok(MAX_PAGE),
        Some(n) => usize::try_from(n)
            .ok()
            .filter(|n| (1..=MAX_PAGE).contains(n))
            .ok_or_else(|| {
                LogsError::InvalidParameter(format!(
                    "limit must be between 1 and {MAX_PAGE}, got {n}"
                ))
            }),
    }
}

fn parse_token(token: Option<&str>) -> LogsResult<usize> {
    token.map_or(Ok(0), |t| {
        t.parse()
            .map_err(|_| LogsError::InvalidParameter("The specified nextToken is invalid.".to_owned()))
    })
}

/// Slice one page and the token of the next one.
fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> (Vec<T>, Option<String>) {
    let total = items.len();
    let page: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
    let next = offset + page.len();
    let token = (next < total).then(|| next.to_string());
    (page, token)
}

fn validate_group_name(name: &str) -> LogsResult<()> {
    let valid = (1..=512).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"._-/#:".contains(&b))
        && !name.contains(":log-stream:");
    if valid {
        Ok(())
    } else {
        Err(LogsError::InvalidParameter(format!(
            "Invalid log group name: {name}"
        )))
    }
}

fn validate_stream_name(name: &str) -> LogsResult<()> {
    if (1..=512).contains(&name.len()) && !name.contains([':', '*']) {
        Ok(())
    } else {
        Err(LogsError::InvalidParameter(format!(
            "Invalid log stream name: {name}"
        )))
    }
}
