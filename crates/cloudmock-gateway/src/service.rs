//! The gateway service: one entry point for every protocol.
//!
//! [`Gateway`] runs each request through the same pipeline:
//!
//! 1. Health check interception (`/_localstack/health`, `/_health`, `/health`)
//! 2. CORS preflight (`OPTIONS`)
//! 3. Body collection
//! 4. Namespace and identity resolution
//! 5. Protocol classification via [`classify`]
//! 6. Handler resolution in the [`ServiceRegistry`] and dispatch
//! 7. Success or error encoding in the request's protocol
//! 8. Common response headers (`x-amz-request-id`, `x-amzn-requestid`, `Server`)

use std::{convert::Infallible, fmt::Display, future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use cloudmock_core::{AwsRegion, Namespace};
use http::{HeaderValue, Method, Request, Response, StatusCode, request::Parts};
use http_body::Body;
use http_body_util::BodyExt;
use hyper::{body::Incoming, service::Service};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    auth::identify,
    body::ResponseBody,
    context::{NAMESPACE_HEADER, RequestContext},
    dispatch::{AWS_JSON_1_1, RestRequest, ServiceRegistry},
    error::{ApiError, ProtocolFamily},
    params::QueryParams,
    protocol::{ClassifyError, Protocol, classify},
    response::{
        json_error_response, json_response, query_error_response, query_response,
        rest_error_response,
    },
};

/// Hyper-compatible gateway dispatching to the registered handlers.
///
/// Every request is traced in a child span of the span given at
/// construction, so gateways built side by side never share logging state.
#[derive(Debug, Clone)]
pub struct Gateway {
    registry: Arc<ServiceRegistry>,
    span: Span,
    region: AwsRegion,
}

impl Gateway {
    /// A gateway over `registry`, tracing requests under `span`.
    #[must_use]
    pub fn new(registry: ServiceRegistry, span: Span) -> Self {
        Self {
            registry: Arc::new(registry),
            span,
            region: AwsRegion::default(),
        }
    }

    /// Set the region reported to handlers.
    #[must_use]
    pub fn with_region(mut self, region: AwsRegion) -> Self {
        self.region = region;
        self
    }

    /// The handlers this gateway dispatches to.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Process one request end to end. Never fails: every error is encoded.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            parent: &self.span,
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );
        let response = self
            .process_request(req, &request_id)
            .instrument(span)
            .await;
        add_common_headers(response, &request_id)
    }

    async fn process_request<B>(&self, req: Request<B>, request_id: &str) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Display,
    {
        debug!(uri = %req.uri(), "processing request");

        if is_health_check(req.method(), req.uri().path()) {
            return health_check_response(&self.registry.service_names());
        }

        if req.method() == Method::OPTIONS {
            return cors_preflight_response();
        }

        let (parts, incoming) = req.into_parts();
        let body = match incoming.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                error!(error = %err, "failed to collect request body");
                let err = ApiError::internal("Failed to read request body");
                return rest_error_response(&err, request_id, false);
            }
        };

        let namespace = Namespace::from_header(
            parts
                .headers
                .get(NAMESPACE_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        let protocol = match classify(&parts.method, &parts.uri, &parts.headers, &body) {
            Ok(protocol) => protocol,
            Err(ClassifyError { family, error }) => {
                warn!(%namespace, code = %error.code, "failed to classify request");
                return encode_error(family, &error, request_id, &parts.method);
            }
        };

        let identity = identify(&parts.headers, &QueryParams::from_query(parts.uri.query()));
        let ctx = RequestContext::new(namespace, request_id)
            .with_identity(identity)
            .with_region(self.region.clone());

        match protocol {
            Protocol::HeaderTarget {
                service_prefix,
                operation,
            } => self.dispatch_json(ctx, &service_prefix, operation, body).await,
            Protocol::Query {
                action,
                version,
                params,
            } => self.dispatch_query(ctx, action, version.as_deref(), params).await,
            Protocol::Rest {
                container,
                key,
                query,
            } => {
                self.dispatch_rest(ctx, parts, Some(container), key, query, body)
                    .await
            }
            Protocol::RootListing { query } => {
                self.dispatch_rest(ctx, parts, None, None, query, body).await
            }
        }
    }

    async fn dispatch_json(
        &self,
        ctx: RequestContext,
        service_prefix: &str,
        operation: String,
        body: Bytes,
    ) -> Response<ResponseBody> {
        let request_id = ctx.request_id.clone();
        let handler = match self.registry.resolve_json(service_prefix, &operation) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(namespace = %ctx.namespace, service_prefix, %operation, "unknown JSON operation");
                return json_error_response(&err, AWS_JSON_1_1, &request_id);
            }
        };
        info!(
            namespace = %ctx.namespace,
            protocol = "json",
            service = handler.service_name(),
            operation = %operation,
            "dispatching request"
        );
        match handler.handle(ctx, operation, body).await {
            Ok(value) => json_response(&value, handler.content_type(), &request_id),
            Err(err) => {
                log_handler_error(&err);
                json_error_response(&err, handler.content_type(), &request_id)
            }
        }
    }

    async fn dispatch_query(
        &self,
        ctx: RequestContext,
        action: String,
        version: Option<&str>,
        params: QueryParams,
    ) -> Response<ResponseBody> {
        let request_id = ctx.request_id.clone();
        let handler = match self.registry.resolve_query(&action, version) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(namespace = %ctx.namespace, %action, ?version, "no handler for action");
                return query_error_response(&err, &request_id);
            }
        };
        info!(
            namespace = %ctx.namespace,
            protocol = "query",
            service = handler.service_name(),
            operation = %action,
            "dispatching request"
        );
        match handler.handle(ctx, action.clone(), params).await {
            Ok(output) => query_response(
                &action,
                handler.xml_namespace(),
                output.result,
                &request_id,
            ),
            Err(err) => {
                log_handler_error(&err);
                query_error_response(&err, &request_id)
            }
        }
    }

    async fn dispatch_rest(
        &self,
        ctx: RequestContext,
        parts: Parts,
        container: Option<String>,
        key: Option<String>,
        query: QueryParams,
        body: Bytes,
    ) -> Response<ResponseBody> {
        let request_id = ctx.request_id.clone();
        let head = parts.method == Method::HEAD;
        let request = RestRequest {
            method: parts.method,
            container,
            key,
            query,
            headers: parts.headers,
            body,
        };
        let handler = match self.registry.resolve_rest(&request.resource()) {
            Ok(handler) => handler,
            Err(err) => {
                warn!(namespace = %ctx.namespace, path = %request.resource(), "no REST handler");
                return rest_error_response(&err, &request_id, head);
            }
        };
        info!(
            namespace = %ctx.namespace,
            protocol = "rest",
            service = handler.service_name(),
            container = ?request.container,
            key = ?request.key,
            "dispatching request"
        );
        let resource = request.resource();
        match handler.handle(ctx, request).await {
            Ok(response) => response,
            Err(err) => {
                log_handler_error(&err);
                let err = if err.resource.is_some() {
                    err
                } else {
                    err.with_resource(resource)
                };
                rest_error_response(&err, &request_id, head)
            }
        }
    }
}

impl Service<Request<Incoming>> for Gateway {
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let gateway = self.clone();
        Box::pin(async move { Ok(gateway.handle(req).await) })
    }
}

fn encode_error(
    family: ProtocolFamily,
    error: &ApiError,
    request_id: &str,
    method: &Method,
) -> Response<ResponseBody> {
    match family {
        ProtocolFamily::Json => json_error_response(error, AWS_JSON_1_1, request_id),
        ProtocolFamily::Query => query_error_response(error, request_id),
        ProtocolFamily::Rest => rest_error_response(error, request_id, method == Method::HEAD),
    }
}

fn log_handler_error(err: &ApiError) {
    if err.is_client_error() {
        debug!(code = %err.code, message = %err.message, "operation returned error");
    } else {
        error!(code = %err.code, message = %err.message, "operation failed");
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &Method, path: &str) -> bool {
    *method == Method::GET
        && (path == "/_localstack/health" || path == "/_health" || path == "/health")
}

/// Health document listing every registered service.
fn health_check_response(services: &[&str]) -> Response<ResponseBody> {
    let services: serde_json::Map<String, serde_json::Value> = services
        .iter()
        .map(|name| ((*name).to_owned(), serde_json::Value::from("running")))
        .collect();
    let body = serde_json::json!({ "services": services });
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(ResponseBody::from_string(body.to_string()))
        .expect("static health response should be valid")
}

/// Produce a CORS preflight response.
fn cors_preflight_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Methods", "GET, PUT, POST, DELETE, HEAD, OPTIONS")
        .header("Access-Control-Allow-Headers", "*, Authorization, Content-Type, x-amz-*")
        .header("Access-Control-Max-Age", "86400")
        .body(ResponseBody::empty())
        .expect("static CORS response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: Response<ResponseBody>,
    request_id: &str,
) -> Response<ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amzn-requestid", hv);
    }

    headers.insert("Server", HeaderValue::from_static("CloudMock"));
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Expose-Headers",
        HeaderValue::from_static("x-amz-request-id, x-amzn-requestid, ETag"),
    );

    response
}

#[cfg(test)]
mod tests {
    use http_body_util::Full;

    use super::*;
    use crate::{
        HandlerFuture, JsonHandler, RestHandler, dispatch::tests::EchoQuery,
        response::xml_response, xml::XmlElement,
    };

    struct EchoJson;

    impl JsonHandler for EchoJson {
        fn service_name(&self) -> &'static str {
            "echo"
        }

        fn target_prefix(&self) -> &'static str {
            "Echo_20200101"
        }

        fn supports(&self, operation: &str) -> bool {
            matches!(operation, "Echo" | "Fail")
        }

        fn handle(
            &self,
            ctx: RequestContext,
            operation: String,
            body: Bytes,
        ) -> HandlerFuture<serde_json::Value> {
            Box::pin(async move {
                if operation == "Fail" {
                    return Err(ApiError::bad_request("ResourceNotFoundException", "nope"));
                }
                let input: serde_json::Value =
                    serde_json::from_slice(&body).map_err(|e| ApiError::serialization(e.to_string()))?;
                Ok(serde_json::json!({
                    "namespace": ctx.namespace.as_str(),
                    "input": input,
                }))
            })
        }
    }

    struct EchoRest;

    impl RestHandler for EchoRest {
        fn service_name(&self) -> &'static str {
            "files"
        }

        fn handle(
            &self,
            ctx: RequestContext,
            request: RestRequest,
        ) -> HandlerFuture<Response<ResponseBody>> {
            Box::pin(async move {
                if request.key.as_deref() == Some("missing") {
                    return Err(ApiError::not_found("NoSuchKey", "missing"));
                }
                let mut children = vec![XmlElement::text("Namespace", ctx.namespace.as_str())];
                children.extend(XmlElement::optional("Container", request.container));
                children.extend(XmlElement::optional("Key", request.key));
                Ok(xml_response(
                    StatusCode::OK,
                    "application/xml",
                    "Echo",
                    None,
                    &children,
                ))
            })
        }
    }

    fn gateway() -> Gateway {
        let registry = ServiceRegistry::new()
            .with_rest(EchoRest)
            .with_json(EchoJson)
            .with_query(EchoQuery {
                name: "alpha",
                version: "2020-01-01",
                actions: &["Ping"],
            });
        Gateway::new(registry, Span::none())
    }

    fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    async fn send(req: Request<Full<Bytes>>) -> (StatusCode, http::HeaderMap, String) {
        let response = gateway().handle(req).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_should_report_registered_services_on_health() {
        let req = request(Method::GET, "/_localstack/health")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["services"]["files"], "running");
        assert_eq!(value["services"]["alpha"], "running");
        assert_eq!(value["services"]["echo"], "running");
    }

    #[tokio::test]
    async fn test_should_answer_cors_preflight() {
        let req = request(Method::OPTIONS, "/bucket/key")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, headers, _) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_should_dispatch_json_target_with_namespace() {
        let req = request(Method::POST, "/")
            .header("x-amz-target", "Echo_20200101.Echo")
            .header(NAMESPACE_HEADER, "tenant-a")
            .body(Full::new(Bytes::from_static(b"{\"a\":1}")))
            .unwrap();
        let (status, headers, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], AWS_JSON_1_1);
        assert_eq!(headers["server"], "CloudMock");
        assert!(headers.contains_key("x-amzn-requestid"));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["namespace"], "tenant-a");
        assert_eq!(value["input"]["a"], 1);
    }

    #[tokio::test]
    async fn test_should_encode_json_errors() {
        let req = request(Method::POST, "/")
            .header("x-amz-target", "Echo_20200101.Fail")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["__type"], "ResourceNotFoundException");

        let req = request(Method::POST, "/")
            .header("x-amz-target", "Other_1.Echo")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("UnknownOperationException"));
    }

    #[tokio::test]
    async fn test_should_route_form_post_to_root_as_query() {
        let req = request(Method::POST, "/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(b"Action=Ping&Version=2020-01-01")))
            .unwrap();
        let (status, headers, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/xml");
        assert!(body.contains("<PingResponse xmlns=\"urn:echo\"><PingResult>"));
        assert!(body.contains("<Namespace>undefined</Namespace>"));
        let request_id = headers["x-amz-request-id"].to_str().unwrap();
        assert!(body.contains(&format!("<RequestId>{request_id}</RequestId>")));
    }

    #[tokio::test]
    async fn test_should_reject_unknown_action() {
        let req = request(Method::GET, "/?Action=Nope")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("<ErrorResponse><Error><Type>Sender</Type><Code>InvalidAction</Code>"));
    }

    #[tokio::test]
    async fn test_should_dispatch_rest_and_root_listing() {
        let req = request(Method::GET, "/bucket/a%20b/c")
            .header(NAMESPACE_HEADER, "t1")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(
            "<Namespace>t1</Namespace><Container>bucket</Container><Key>a b/c</Key>"
        ));

        let req = request(Method::GET, "/").body(Full::new(Bytes::new())).unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<Container>"));
    }

    #[tokio::test]
    async fn test_should_attach_resource_to_rest_errors() {
        let req = request(Method::GET, "/bucket/missing")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<Code>NoSuchKey</Code>"));
        assert!(body.contains("<Resource>/bucket/missing</Resource>"));
    }

    #[tokio::test]
    async fn test_should_report_missing_rest_handler() {
        let gateway = Gateway::new(ServiceRegistry::new(), Span::none());
        let req = request(Method::GET, "/bucket")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = gateway.handle(req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("<Code>UnknownOperation</Code>"));
    }
}
