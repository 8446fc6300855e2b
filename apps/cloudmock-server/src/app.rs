//! Wiring of the store, the object data-plane and the service handlers into
//! one [`Gateway`].

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use cloudmock_core::CloudMockConfig;
use cloudmock_gateway::{Gateway, ServiceRegistry};
use cloudmock_logs::LogsHandler;
use cloudmock_s3_core::ObjectDataPlane;
use cloudmock_s3_http::S3Handler;
use cloudmock_sns::SnsHandler;
use cloudmock_store::{MemoryResourceStore, ResourceStore, SqliteResourceStore};
use cloudmock_sts::StsHandler;
use tempfile::TempDir;
use tracing::{Span, info};

/// Every service this binary can host.
pub const ALL_SERVICES: &[&str] = &["s3", "sns", "sts", "logs"];

/// A ready-to-serve gateway plus the resources it owns.
#[derive(Debug)]
pub struct App {
    gateway: Gateway,
    // Object bytes of a non-persistent run live here and vanish with the app.
    _scratch: Option<TempDir>,
}

impl App {
    /// Build the gateway for the `enabled` services.
    pub async fn build(config: &CloudMockConfig, enabled: &[String], span: Span) -> Result<Self> {
        let is_enabled = |name: &str| enabled.iter().any(|s| s == name);

        let store = open_store(config).await?;
        let (objects_root, scratch) = objects_root(config)?;

        let mut registry = ServiceRegistry::new();

        if is_enabled("s3") {
            info!(root = %objects_root.display(), "initializing S3 service");
            let plane = ObjectDataPlane::new(Arc::clone(&store), objects_root)
                .with_region(config.default_region.clone());
            registry = registry.with_rest(S3Handler::new(Arc::new(plane)));
        }
        if is_enabled("sns") {
            info!("initializing SNS service");
            registry = registry.with_query(SnsHandler::new(Arc::clone(&store)));
        }
        if is_enabled("sts") {
            info!("initializing STS service");
            registry = registry.with_query(StsHandler);
        }
        if is_enabled("logs") {
            info!("initializing CloudWatch Logs service");
            registry = registry.with_json(LogsHandler::new(Arc::clone(&store)));
        }

        if registry.service_names().is_empty() {
            anyhow::bail!("no services enabled. Check the SERVICES environment variable.");
        }

        let gateway = Gateway::new(registry, span).with_region(config.default_region.clone());
        Ok(Self {
            gateway,
            _scratch: scratch,
        })
    }

    /// The request entry point.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

async fn open_store(config: &CloudMockConfig) -> Result<Arc<dyn ResourceStore>> {
    if !config.persistence {
        return Ok(Arc::new(MemoryResourceStore::new()));
    }

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    let url = config.database_url();
    let store = SqliteResourceStore::connect(&url)
        .await
        .with_context(|| format!("failed to open resource store at {url}"))?;
    info!(url = %url, "persistence enabled");
    Ok(Arc::new(store))
}

fn objects_root(config: &CloudMockConfig) -> Result<(PathBuf, Option<TempDir>)> {
    if config.persistence {
        return Ok((config.objects_dir(), None));
    }
    let scratch = tempfile::Builder::new()
        .prefix("cloudmock-")
        .tempdir()
        .context("failed to create scratch directory for object bytes")?;
    Ok((scratch.path().to_path_buf(), Some(scratch)))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use cloudmock_gateway::NAMESPACE_HEADER;
    use http::{Method, Request, StatusCode, header::CONTENT_TYPE};
    use http_body_util::{BodyExt, Full};

    use super::*;

    fn all() -> Vec<String> {
        ALL_SERVICES.iter().map(ToString::to_string).collect()
    }

    async fn app(services: Vec<String>) -> App {
        App::build(&CloudMockConfig::default(), &services, Span::none())
            .await
            .unwrap()
    }

    async fn send(app: &App, req: Request<Full<Bytes>>) -> (StatusCode, http::HeaderMap, String) {
        let response = app.gateway().handle(req).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn query(ns: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(NAMESPACE_HEADER, ns)
            .body(Full::new(Bytes::from(body.to_owned())))
            .unwrap()
    }

    fn rest(method: Method, ns: &str, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(NAMESPACE_HEADER, ns)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_create_topic_idempotently() {
        let app = app(all()).await;
        let body = "Action=CreateTopic&Name=orders&Version=2010-03-31";
        let (status, _, first) = send(&app, query("t1", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(first.contains(
            "<TopicArn>arn:aws:sns:us-east-1:000000000000:orders</TopicArn>"
        ));
        let (_, _, second) = send(&app, query("t1", body)).await;
        assert!(second.contains("arn:aws:sns:us-east-1:000000000000:orders"));

        let (_, _, listed) = send(&app, query("t1", "Action=ListTopics")).await;
        assert_eq!(listed.matches("<TopicArn>").count(), 1);
    }

    #[tokio::test]
    async fn test_should_isolate_objects_by_namespace() {
        let app = app(all()).await;
        let (status, _, _) = send(&app, rest(Method::PUT, "a", "/shared", "")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, headers, _) =
            send(&app, rest(Method::PUT, "a", "/shared/hello.txt", "hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get("etag").unwrap(),
            "\"49f68a5c8493ec2c0bf489821c21fc3b\""
        );

        let (status, _, body) = send(&app, rest(Method::GET, "a", "/shared/hello.txt", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hi");

        let (status, _, body) = send(&app, rest(Method::GET, "b", "/shared/hello.txt", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<Code>NoSuchBucket</Code>"));
    }

    #[tokio::test]
    async fn test_should_report_caller_identity() {
        let app = app(all()).await;
        let (status, _, body) = send(
            &app,
            query("t", "Action=GetCallerIdentity&Version=2011-06-15"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<Account>000000000000</Account>"));
    }

    #[tokio::test]
    async fn test_should_serve_logs_json() {
        let app = app(all()).await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("x-amz-target", "Logs_20140328.CreateLogGroup")
            .header(CONTENT_TYPE, "application/x-amz-json-1.1")
            .body(Full::new(Bytes::from_static(br#"{"logGroupName":"/app"}"#)))
            .unwrap();
        let (status, _, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("x-amz-target", "Logs_20140328.CreateLogGroup")
            .header(CONTENT_TYPE, "application/x-amz-json-1.1")
            .body(Full::new(Bytes::from_static(br#"{"logGroupName":"/app"}"#)))
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["__type"], "ResourceAlreadyExistsException");
    }

    #[tokio::test]
    async fn test_should_only_register_enabled_services() {
        let app = app(vec!["sts".to_owned()]).await;
        assert_eq!(app.gateway().registry().service_names(), vec!["sts"]);

        let (status, _, body) = send(&app, rest(Method::GET, "t", "/bucket", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("UnknownOperation"));
    }

    #[tokio::test]
    async fn test_should_refuse_empty_service_set() {
        let result = App::build(&CloudMockConfig::default(), &[], Span::none()).await;
        assert!(result.is_err());
    }
}
