//! Configuration management for CloudMock.
//!
//! All configuration is driven by environment variables, matching LocalStack
//! conventions where one exists.

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    error::{CoreError, CoreResult},
    types::AwsRegion,
};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Text,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CoreError::Config(format!(
                "unsupported LOG_FORMAT `{other}` (expected `text` or `json`)"
            ))),
        }
    }
}

/// Global configuration for the CloudMock server.
///
/// Loaded via [`CloudMockConfig::from_env`]:
///
/// | Variable | Default |
/// |----------|---------|
/// | `GATEWAY_LISTEN` | `0.0.0.0:4566` |
/// | `DEFAULT_REGION` | `us-east-1` |
/// | `LOG_LEVEL` | `info` |
/// | `LOG_FORMAT` | `text` |
/// | `PERSISTENCE` | `false` |
/// | `DATA_DIR` | `./data` |
/// | `DATABASE_URL` | `sqlite://{DATA_DIR}/cloudmock.db` |
///
/// # Examples
///
/// ```
/// use cloudmock_core::CloudMockConfig;
///
/// let config = CloudMockConfig::builder().persistence(true).build();
/// assert!(config.persistence);
/// assert_eq!(config.gateway_listen, "0.0.0.0:4566");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CloudMockConfig {
    /// Bind address for the gateway.
    #[builder(default = String::from("0.0.0.0:4566"))]
    pub gateway_listen: String,

    /// Region reported by services that do not carry one in the request.
    #[builder(default)]
    pub default_region: AwsRegion,

    /// Log level filter string (e.g. `"info"`, `"cloudmock_gateway=debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format.
    #[builder(default)]
    pub log_format: LogFormat,

    /// Whether the resource store is backed by sqlite instead of memory.
    #[builder(default = false)]
    pub persistence: bool,

    /// Root directory for object bytes and the default database file.
    #[builder(default = PathBuf::from("./data"))]
    pub data_dir: PathBuf,

    /// Explicit database URL. Derived from `data_dir` when unset.
    #[builder(default, setter(strip_option))]
    pub database_url: Option<String>,
}

impl Default for CloudMockConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CloudMockConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// An unparsable `LOG_FORMAT` falls back to `text`; call
    /// [`CloudMockConfig::validate`] to surface such mistakes.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = AwsRegion::new(v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            config.log_format = v.parse().unwrap_or_default();
        }
        if let Ok(v) = std::env::var("PERSISTENCE") {
            config.persistence = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                config.database_url = Some(v);
            }
        }

        config
    }

    /// Check the fields that can only be validated by parsing them.
    pub fn validate(&self) -> CoreResult<()> {
        self.listen_addr()?;
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            v.parse::<LogFormat>()?;
        }
        Ok(())
    }

    /// The parsed gateway bind address.
    pub fn listen_addr(&self) -> CoreResult<SocketAddr> {
        self.gateway_listen.parse().map_err(|e| {
            CoreError::Config(format!(
                "invalid GATEWAY_LISTEN `{}`: {e}",
                self.gateway_listen
            ))
        })
    }

    /// Directory holding object payload files.
    #[must_use]
    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    /// The database URL, either explicit or derived from the data directory.
    #[must_use]
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}", self.data_dir.join("cloudmock.db").display()),
        }
    }
}

/// Parse a boolean from an environment variable value.
///
/// Accepts `"1"`, `"true"`, `"yes"` (case-insensitive) as `true`; everything
/// else is `false`.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = CloudMockConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:4566");
        assert_eq!(config.default_region.as_str(), "us-east-1");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.persistence);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_should_derive_database_url_from_data_dir() {
        let config = CloudMockConfig::builder()
            .data_dir(PathBuf::from("/tmp/cm"))
            .build();
        assert_eq!(config.database_url(), "sqlite:///tmp/cm/cloudmock.db");
        assert_eq!(config.objects_dir(), PathBuf::from("/tmp/cm/objects"));
    }

    #[test]
    fn test_should_prefer_explicit_database_url() {
        let config = CloudMockConfig::builder()
            .database_url("sqlite::memory:".to_owned())
            .build();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }

    #[test]
    fn test_should_parse_log_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_should_reject_invalid_listen_address() {
        let config = CloudMockConfig::builder()
            .gateway_listen("not-an-address".to_owned())
            .build();
        assert!(matches!(config.listen_addr(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("YES"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
