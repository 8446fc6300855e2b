//! Handler traits and the service registry.
//!
//! Handlers are registered per protocol. Resolution rules:
//!
//! - JSON: the handler whose target prefix equals the header's prefix and
//!   which supports the operation.
//! - Query: the handlers that support the action; when several do, the one
//!   whose API version equals the request's `Version`.
//! - REST: the single registered REST handler.

use std::{fmt, future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use http::{HeaderMap, Method};

use crate::{
    body::ResponseBody, context::RequestContext, error::ApiError, params::QueryParams,
    xml::XmlElement,
};

/// Boxed handler future.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

/// Content type of AWS JSON 1.1 documents.
pub const AWS_JSON_1_1: &str = "application/x-amz-json-1.1";

/// A service speaking header-targeted JSON.
pub trait JsonHandler: Send + Sync + 'static {
    /// Name reported by health checks, e.g. `logs`.
    fn service_name(&self) -> &'static str;

    /// Text before the `.` in `X-Amz-Target`, e.g. `Logs_20140328`.
    fn target_prefix(&self) -> &'static str;

    /// Content type of success and error responses.
    fn content_type(&self) -> &'static str {
        AWS_JSON_1_1
    }

    /// Whether `operation` is implemented.
    fn supports(&self, operation: &str) -> bool;

    /// Handle one operation. The body is the raw JSON request document.
    fn handle(
        &self,
        ctx: RequestContext,
        operation: String,
        body: Bytes,
    ) -> HandlerFuture<serde_json::Value>;
}

/// The `{Action}Result` content of a query response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// Children of `{Action}Result`; `None` omits the element entirely.
    pub result: Option<Vec<XmlElement>>,
}

impl QueryOutput {
    /// An action with no result element.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An action whose result holds `children`.
    #[must_use]
    pub fn result(children: Vec<XmlElement>) -> Self {
        Self {
            result: Some(children),
        }
    }
}

/// A service speaking form/query with XML envelopes.
pub trait QueryHandler: Send + Sync + 'static {
    /// Name reported by health checks, e.g. `sns`.
    fn service_name(&self) -> &'static str;

    /// The `Version` parameter this service answers to.
    fn api_version(&self) -> &'static str;

    /// Namespace set on the response envelope.
    fn xml_namespace(&self) -> &'static str;

    /// Whether `action` is implemented.
    fn supports(&self, action: &str) -> bool;

    /// Handle one action.
    fn handle(
        &self,
        ctx: RequestContext,
        action: String,
        params: QueryParams,
    ) -> HandlerFuture<QueryOutput>;
}

/// A path-addressed request.
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method.
    pub method: Method,
    /// First path segment; `None` for root listings.
    pub container: Option<String>,
    /// Rest of the path.
    pub key: Option<String>,
    /// URL query pairs.
    pub query: QueryParams,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
}

impl RestRequest {
    /// The request path as the client sent it (decoded), for error resources.
    #[must_use]
    pub fn resource(&self) -> String {
        match (&self.container, &self.key) {
            (None, _) => "/".to_owned(),
            (Some(c), None) => format!("/{c}"),
            (Some(c), Some(k)) => format!("/{c}/{k}"),
        }
    }

    /// A header value as UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A service speaking path-addressed REST.
pub trait RestHandler: Send + Sync + 'static {
    /// Name reported by health checks, e.g. `s3`.
    fn service_name(&self) -> &'static str;

    /// Handle one request and build the full response.
    fn handle(
        &self,
        ctx: RequestContext,
        request: RestRequest,
    ) -> HandlerFuture<http::Response<ResponseBody>>;
}

/// Every handler the gateway can dispatch to.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    json: Vec<Arc<dyn JsonHandler>>,
    query: Vec<Arc<dyn QueryHandler>>,
    rest: Option<Arc<dyn RestHandler>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field(
                "json",
                &self.json.iter().map(|h| h.target_prefix()).collect::<Vec<_>>(),
            )
            .field(
                "query",
                &self
                    .query
                    .iter()
                    .map(|h| (h.service_name(), h.api_version()))
                    .collect::<Vec<_>>(),
            )
            .field("rest", &self.rest.as_ref().map(|h| h.service_name()))
            .finish()
    }
}

impl ServiceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a JSON handler.
    #[must_use]
    pub fn with_json(mut self, handler: impl JsonHandler) -> Self {
        self.json.push(Arc::new(handler));
        self
    }

    /// Register a query handler.
    #[must_use]
    pub fn with_query(mut self, handler: impl QueryHandler) -> Self {
        self.query.push(Arc::new(handler));
        self
    }

    /// Register the REST handler, replacing any previous one.
    #[must_use]
    pub fn with_rest(mut self, handler: impl RestHandler) -> Self {
        self.rest = Some(Arc::new(handler));
        self
    }

    /// Names of every registered service, in registration order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .rest
            .iter()
            .map(|h| h.service_name())
            .chain(self.query.iter().map(|h| h.service_name()))
            .chain(self.json.iter().map(|h| h.service_name()))
            .collect();
        names.dedup();
        names
    }

    /// Resolve a JSON handler by target prefix and operation.
    pub fn resolve_json(
        &self,
        service_prefix: &str,
        operation: &str,
    ) -> Result<Arc<dyn JsonHandler>, ApiError> {
        self.json
            .iter()
            .find(|h| h.target_prefix() == service_prefix && h.supports(operation))
            .cloned()
            .ok_or_else(|| ApiError::unknown_json_operation(&format!("{service_prefix}.{operation}")))
    }

    /// Resolve a query handler by action, using `version` to break ties.
    pub fn resolve_query(
        &self,
        action: &str,
        version: Option<&str>,
    ) -> Result<Arc<dyn QueryHandler>, ApiError> {
        let candidates: Vec<&Arc<dyn QueryHandler>> =
            self.query.iter().filter(|h| h.supports(action)).collect();
        match candidates.as_slice() {
            [] => Err(ApiError::invalid_action(action)),
            [only] => Ok(Arc::clone(only)),
            many => many
                .iter()
                .find(|h| Some(h.api_version()) == version)
                .map(|h| Arc::clone(h))
                .ok_or_else(|| ApiError::invalid_action(action)),
        }
    }

    /// The REST handler.
    pub fn resolve_rest(&self, path: &str) -> Result<Arc<dyn RestHandler>, ApiError> {
        self.rest
            .clone()
            .ok_or_else(|| ApiError::unknown_rest_operation(path))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Query handler answering a fixed action set with its own name.
    pub(crate) struct EchoQuery {
        pub(crate) name: &'static str,
        pub(crate) version: &'static str,
        pub(crate) actions: &'static [&'static str],
    }

    impl QueryHandler for EchoQuery {
        fn service_name(&self) -> &'static str {
            self.name
        }

        fn api_version(&self) -> &'static str {
            self.version
        }

        fn xml_namespace(&self) -> &'static str {
            "urn:echo"
        }

        fn supports(&self, action: &str) -> bool {
            self.actions.contains(&action)
        }

        fn handle(
            &self,
            ctx: RequestContext,
            _action: String,
            _params: QueryParams,
        ) -> HandlerFuture<QueryOutput> {
            let name = self.name;
            Box::pin(async move {
                Ok(QueryOutput::result(vec![
                    XmlElement::text("Service", name),
                    XmlElement::text("Namespace", ctx.namespace.as_str()),
                ]))
            })
        }
    }

    fn registry() -> ServiceRegistry {
        ServiceRegistry::new()
            .with_query(EchoQuery {
                name: "alpha",
                version: "2020-01-01",
                actions: &["Shared", "OnlyAlpha"],
            })
            .with_query(EchoQuery {
                name: "beta",
                version: "2021-01-01",
                actions: &["Shared"],
            })
    }

    #[test]
    fn test_should_resolve_unique_action_without_version() {
        let handler = registry().resolve_query("OnlyAlpha", None).unwrap();
        assert_eq!(handler.service_name(), "alpha");
    }

    #[test]
    fn test_should_disambiguate_shared_action_by_version() {
        let registry = registry();
        assert_eq!(
            registry
                .resolve_query("Shared", Some("2021-01-01"))
                .unwrap()
                .service_name(),
            "beta"
        );
        assert_eq!(
            registry
                .resolve_query("Shared", Some("2020-01-01"))
                .unwrap()
                .service_name(),
            "alpha"
        );
    }

    #[test]
    fn test_should_reject_ambiguous_or_unknown_action() {
        let registry = registry();
        assert_eq!(
            registry.resolve_query("Shared", None).err().unwrap().code,
            "InvalidAction"
        );
        assert_eq!(
            registry
                .resolve_query("Shared", Some("1999-01-01"))
                .err()
                .unwrap()
                .code,
            "InvalidAction"
        );
        assert_eq!(
            registry.resolve_query("Nope", None).err().unwrap().code,
            "InvalidAction"
        );
    }

    #[test]
    fn test_should_report_missing_rest_handler() {
        let err = registry().resolve_rest("/bucket").err().unwrap();
        assert_eq!(err.status, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_list_service_names() {
        assert_eq!(registry().service_names(), ["alpha", "beta"]);
    }
}
