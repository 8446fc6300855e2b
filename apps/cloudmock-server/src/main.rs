//! CloudMock Server - local AWS control-plane emulator.
//!
//! One gateway classifies every request by protocol shape and hands it to the
//! S3, SNS, STS or CloudWatch Logs handler. Resources are isolated per
//! namespace selected with the `x-cloudmock-namespace` header.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 cloudmock-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `SERVICES` | *(empty = all)* | Comma-separated list of services to enable |
//! | `DEFAULT_REGION` | `us-east-1` | Region used in ARNs and bucket locations |
//! | `PERSISTENCE` | `false` | Keep resources in sqlite under `DATA_DIR` |
//! | `DATA_DIR` | `./data` | Database file and object bytes |
//! | `DATABASE_URL` | *(derived)* | Explicit sqlite URL |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod app;

use anyhow::{Context, Result};
use cloudmock_core::{CloudMockConfig, LogFormat};
use cloudmock_gateway::Gateway;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{ALL_SERVICES, App};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: Gateway) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

fn is_known(name: &str) -> bool {
    ALL_SERVICES.contains(&name)
}

/// Parse a comma-separated services string into a list of service names.
///
/// If the input is empty, returns every known service.
fn parse_services_value(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ALL_SERVICES.iter().map(ToString::to_string).collect()
    } else {
        trimmed
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Connect to the gateway and request the health endpoint.
///
/// Succeeds on a 200 response reporting at least one running service.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET /_localstack/health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = CloudMockConfig::from_env();

    // Docker HEALTHCHECK entry point.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    config.validate().context("invalid configuration")?;
    init_tracing(&config.log_level, config.log_format)?;

    let requested = parse_services_value(&std::env::var("SERVICES").unwrap_or_default());
    for name in requested.iter().filter(|n| !is_known(n)) {
        warn!(service = %name, "unknown service requested, skipping");
    }
    let enabled: Vec<String> = requested.into_iter().filter(|n| is_known(n)).collect();

    let app = App::build(&config, &enabled, info_span!("gateway")).await?;
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        services = ?app.gateway().registry().service_names(),
        persistence = config.persistence,
        version = VERSION,
        "starting CloudMock Server",
    );

    serve(listener, app.gateway().clone()).await
}
