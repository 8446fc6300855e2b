use std::sync::Arc;

use cloudmock_arn::TopicArn;
use cloudmock_core::{AccountId, Namespace};
use cloudmock_gateway::{
    ApiError, HandlerFuture, QueryHandler, QueryOutput, QueryParams, RequestContext, XmlElement,
};
use cloudmock_store::{CreatePolicy, ResourceStore, ResourceStoreExt, TypedResource};
use tracing::info;

use crate::{error::SnsError, state::Topic};

/// SNS query API version.
pub const API_VERSION: &str = "2010-03-31";

/// Namespace of SNS response envelopes.
pub const XML_NAMESPACE: &str = "http://sns.amazonaws.com/doc/2010-03-31/";

const ACTIONS: &[&str] = &[
    "CreateTopic",
    "DeleteTopic",
    "ListTopics",
    "GetTopicAttributes",
    "SetTopicAttributes",
    "TagResource",
    "UntagResource",
    "ListTagsForResource",
];

type SnsResult<T> = Result<T, SnsError>;

/// SNS topic actions backed by the resource store.
#[derive(Debug, Clone)]
pub struct SnsHandler {
    store: Arc<dyn ResourceStore>,
}

impl SnsHandler {
    /// A handler over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        action: &str,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        match action {
            "CreateTopic" => self.create_topic(ctx, params).await,
            "DeleteTopic" => self.delete_topic(ctx, params).await,
            "ListTopics" => self.list_topics(ctx).await,
            "GetTopicAttributes" => self.get_topic_attributes(ctx, params).await,
            "SetTopicAttributes" => self.set_topic_attributes(ctx, params).await,
            "TagResource" => self.tag_resource(ctx, params).await,
            "UntagResource" => self.untag_resource(ctx, params).await,
            "ListTagsForResource" => self.list_tags_for_resource(ctx, params).await,
            other => Err(SnsError::InvalidParameter(format!("Action {other}"))),
        }
    }

    async fn create_topic(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let name = required(params, "Name")?;
        validate_topic_name(name)?;

        let topic = Topic {
            name: name.to_owned(),
            attributes: params
                .member_pairs("Attributes.entry", "key", "value")
                .into_iter()
                .collect(),
            tags: params
                .member_pairs("Tags.member", "Key", "Value")
                .into_iter()
                .collect(),
        };
        let ensured = self
            .store
            .ensure_typed(
                TypedResource::new(name, ctx.namespace.clone(), topic),
                CreatePolicy::ShortCircuit,
            )
            .await?;
        if ensured.is_created() {
            info!(namespace = %ctx.namespace, topic = name, "topic created");
        }

        Ok(QueryOutput::result(vec![XmlElement::text(
            "TopicArn",
            topic_arn(ctx, name).to_string(),
        )]))
    }

    async fn delete_topic(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "TopicArn")?.parse()?;
        let removed = self
            .store
            .delete_typed::<Topic>(&arn.name, &ctx.namespace)
            .await?;
        if removed {
            info!(namespace = %ctx.namespace, topic = %arn.name, "topic deleted");
        }
        Ok(QueryOutput::empty())
    }

    async fn list_topics(&self, ctx: &RequestContext) -> SnsResult<QueryOutput> {
        let members = self
            .store
            .list_typed::<Topic>(&ctx.namespace)
            .await?
            .into_iter()
            .map(|t| {
                XmlElement::parent(
                    "member",
                    vec![XmlElement::text(
                        "TopicArn",
                        topic_arn(ctx, &t.attributes.name).to_string(),
                    )],
                )
            })
            .collect();
        Ok(QueryOutput::result(vec![XmlElement::parent(
            "Topics", members,
        )]))
    }

    async fn get_topic_attributes(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "TopicArn")?.parse()?;
        let topic = self
            .find(&arn.name, &ctx.namespace)
            .await?
            .ok_or(SnsError::TopicNotFound)?;

        let mut attributes = topic.attributes.attributes;
        attributes.insert("TopicArn".to_owned(), arn.to_string());
        attributes.insert("Owner".to_owned(), AccountId::DEFAULT.to_owned());
        attributes.entry("DisplayName".to_owned()).or_default();
        for counter in [
            "SubscriptionsConfirmed",
            "SubscriptionsPending",
            "SubscriptionsDeleted",
        ] {
            attributes.insert(counter.to_owned(), "0".to_owned());
        }

        let entries = attributes
            .into_iter()
            .map(|(k, v)| {
                XmlElement::parent(
                    "entry",
                    vec![XmlElement::text("key", k), XmlElement::text("value", v)],
                )
            })
            .collect();
        Ok(QueryOutput::result(vec![XmlElement::parent(
            "Attributes",
            entries,
        )]))
    }

    async fn set_topic_attributes(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "TopicArn")?.parse()?;
        let name = required(params, "AttributeName")?;
        let value = params.get("AttributeValue").unwrap_or_default();

        let mut topic = self
            .find(&arn.name, &ctx.namespace)
            .await?
            .ok_or(SnsError::TopicNotFound)?;
        topic
            .attributes
            .attributes
            .insert(name.to_owned(), value.to_owned());
        self.store.update_typed(&topic).await?;
        Ok(QueryOutput::empty())
    }

    async fn tag_resource(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "ResourceArn")?.parse()?;
        let tags = params.member_pairs("Tags.member", "Key", "Value");
        if tags.is_empty() {
            return Err(SnsError::InvalidParameter("Tags".to_owned()));
        }
        let mut topic = self
            .find(&arn.name, &ctx.namespace)
            .await?
            .ok_or(SnsError::ResourceNotFound)?;
        topic.attributes.tags.extend(tags);
        self.store.update_typed(&topic).await?;
        Ok(QueryOutput::result(Vec::new()))
    }

    async fn untag_resource(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "ResourceArn")?.parse()?;
        let mut topic = self
            .find(&arn.name, &ctx.namespace)
            .await?
            .ok_or(SnsError::ResourceNotFound)?;
        for key in params.member_list("TagKeys.member") {
            topic.attributes.tags.remove(&key);
        }
        self.store.update_typed(&topic).await?;
        Ok(QueryOutput::result(Vec::new()))
    }

    async fn list_tags_for_resource(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> SnsResult<QueryOutput> {
        let arn: TopicArn = required(params, "ResourceArn")?.parse()?;
        let topic = self
            .find(&arn.name, &ctx.namespace)
            .await?
            .ok_or(SnsError::ResourceNotFound)?;
        let members = topic
            .attributes
            .tags
            .into_iter()
            .map(|(k, v)| {
                XmlElement::parent(
                    "member",
                    vec![XmlElement::text("Key", k), XmlElement::text("Value", v)],
                )
            })
            .collect();
        Ok(QueryOutput::result(vec![XmlElement::parent("Tags", members)]))
    }

    async fn find(
        &self,
        name: &str,
        namespace: &Namespace,
    ) -> SnsResult<Option<TypedResource<Topic>>> {
        Ok(self.store.find_typed::<Topic>(name, namespace).await?)
    }
}

impl QueryHandler for SnsHandler {
    fn service_name(&self) -> &'static str {
        "sns"
    }

    fn api_version(&self) -> &'static str {
        API_VERSION
    }

    fn xml_namespace(&self) -> &'static str {
        XML_NAMESPACE
    }

    fn supports(&self, action: &str) -> bool {
        ACTIONS.contains(&action)
    }

    fn handle(
        &self,
        ctx: RequestContext,
        action: String,
        params: QueryParams,
    ) -> HandlerFuture<QueryOutput> {
        let handler = self.clone();
        Box::pin(async move {
            handler
                .dispatch(&ctx, &action, &params)
                .await
                .map_err(ApiError::from)
        })
    }
}

fn required<'a>(params: &'a QueryParams, name: &str) -> SnsResult<&'a str> {
    params
        .get_non_empty(name)
        .ok_or_else(|| SnsError::InvalidParameter(name.to_owned()))
}

fn topic_arn(ctx: &RequestContext, name: &str) -> TopicArn {
    TopicArn::with_location(ctx.region.as_str(), AccountId::DEFAULT, name)
}

/// Names are 1-256 characters of letters, digits, `-` and `_`, with an
/// optional `.fifo` suffix.
fn validate_topic_name(name: &str) -> SnsResult<()> {
    let base = name.strip_suffix(".fifo").unwrap_or(name);
    let valid = !base.is_empty()
        && name.len() <= 256
        && base
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(SnsError::InvalidParameter(
            "Topic Name must be made up of only uppercase and lowercase ASCII letters, numbers, underscores, and hyphens, and must be between 1 and 256 characters long.".to_owned(),
        ))
    }
}
