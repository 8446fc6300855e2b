//! Protocol classification.
//!
//! Precedence, first match wins:
//!
//! 1. An `X-Amz-Target` header makes the request header-targeted JSON.
//! 2. A non-empty first path segment makes it REST.
//! 3. An `Action` parameter (form body or URL) makes it query.
//! 4. Anything else is a root listing.

use http::{HeaderMap, Method, Uri};
use percent_encoding::percent_decode_str;

use crate::{
    error::{ApiError, ProtocolFamily},
    params::QueryParams,
};

/// Header carrying `{ServicePrefix}.{Operation}` for JSON requests.
pub const TARGET_HEADER: &str = "x-amz-target";

/// The classified request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// `X-Amz-Target: {service_prefix}.{operation}` with a JSON body.
    HeaderTarget {
        /// Text before the last `.`, e.g. `Logs_20140328`.
        service_prefix: String,
        /// Text after the last `.`, e.g. `CreateLogGroup`.
        operation: String,
    },
    /// Form/query request addressed to `/`.
    Query {
        /// The `Action` parameter.
        action: String,
        /// The `Version` parameter, used to disambiguate handlers.
        version: Option<String>,
        /// Form body pairs followed by URL query pairs.
        params: QueryParams,
    },
    /// Path-addressed request.
    Rest {
        /// First path segment, percent-decoded.
        container: String,
        /// Remainder of the path, percent-decoded; `None` when empty.
        key: Option<String>,
        /// URL query pairs.
        query: QueryParams,
    },
    /// Request to `/` without `Action`.
    RootListing {
        /// URL query pairs.
        query: QueryParams,
    },
}

impl Protocol {
    /// The family whose error envelope applies to this request.
    #[must_use]
    pub fn family(&self) -> ProtocolFamily {
        match self {
            Self::HeaderTarget { .. } => ProtocolFamily::Json,
            Self::Query { .. } => ProtocolFamily::Query,
            Self::Rest { .. } | Self::RootListing { .. } => ProtocolFamily::Rest,
        }
    }
}

/// A request that could not be classified, with the envelope to report it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyError {
    /// Envelope family.
    pub family: ProtocolFamily,
    /// The error.
    pub error: ApiError,
}

/// Classify a request. Only a form-encoded body is inspected.
pub fn classify(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Protocol, ClassifyError> {
    if let Some(target) = headers.get(TARGET_HEADER) {
        let target = target.to_str().unwrap_or_default();
        return parse_target(target).ok_or_else(|| ClassifyError {
            family: ProtocolFamily::Json,
            error: ApiError::unknown_json_operation(target),
        });
    }

    let url_params = QueryParams::from_query(uri.query());

    let (container, key) = split_path(uri.path());
    if let Some(container) = container {
        return Ok(Protocol::Rest {
            container,
            key,
            query: url_params,
        });
    }

    let mut params = if *method == Method::POST && is_form_encoded(headers) {
        QueryParams::from_form(body)
    } else {
        QueryParams::default()
    };
    params.extend(url_params.clone());

    match params.get("Action").map(str::to_owned) {
        Some(action) => Ok(Protocol::Query {
            action,
            version: params.get("Version").map(str::to_owned),
            params,
        }),
        None => Ok(Protocol::RootListing { query: url_params }),
    }
}

fn parse_target(target: &str) -> Option<Protocol> {
    let (prefix, operation) = target.trim().rsplit_once('.')?;
    if prefix.is_empty() || operation.is_empty() {
        return None;
    }
    Some(Protocol::HeaderTarget {
        service_prefix: prefix.to_owned(),
        operation: operation.to_owned(),
    })
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}

/// Split `/container/rest/of/key` into decoded parts.
fn split_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (container, key) = match trimmed.split_once('/') {
        Some((container, key)) => (container, Some(key)),
        None => (trimmed, None),
    };
    if container.is_empty() {
        return (None, None);
    }
    let key = key.filter(|k| !k.is_empty()).map(decode);
    (Some(decode(container)), key)
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
