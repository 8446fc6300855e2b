//! Bucket listing pagination shared by ListObjects and ListObjectsV2.

use base64::{Engine, engine::general_purpose::STANDARD};
use cloudmock_gateway::ApiError;
use cloudmock_s3_core::ObjectAttributes;

/// Default and upper bound of `max-keys`.
pub const MAX_KEYS: usize = 1000;

/// One page of a listing.
#[derive(Debug, Default)]
pub struct Page {
    /// Objects on this page.
    pub contents: Vec<ObjectAttributes>,
    /// Rolled-up prefixes when a delimiter is set.
    pub common_prefixes: Vec<String>,
    /// Whether more entries follow.
    pub is_truncated: bool,
    /// Last key or prefix emitted; where the next page starts.
    pub last: Option<String>,
}

impl Page {
    /// Number of keys and prefixes on the page.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.contents.len() + self.common_prefixes.len()
    }
}

/// Paginate `objects` (sorted by key, already filtered by `prefix`).
///
/// Entries at or before `after` are skipped. With a delimiter, keys sharing
/// the segment up to the next delimiter after the prefix collapse into one
/// common prefix, which counts as a single entry.
#[must_use]
pub fn paginate(
    objects: Vec<ObjectAttributes>,
    prefix: &str,
    delimiter: Option<&str>,
    after: Option<&str>,
    max_keys: usize,
) -> Page {
    let mut page = Page::default();
    let delimiter = delimiter.filter(|d| !d.is_empty());

    for object in objects {
        if after.is_some_and(|a| object.key.as_str() <= a) {
            continue;
        }

        let rolled_up = delimiter.and_then(|d| {
            let rest = object.key.get(prefix.len()..)?;
            rest.find(d)
                .map(|i| object.key[..prefix.len() + i + d.len()].to_owned())
        });

        if let Some(common) = rolled_up {
            if page.common_prefixes.last() == Some(&common)
                || after.is_some_and(|a| a.starts_with(common.as_str()))
            {
                continue;
            }
            if page.key_count() >= max_keys {
                page.is_truncated = true;
                break;
            }
            page.last = Some(common.clone());
            page.common_prefixes.push(common);
            continue;
        }

        if page.key_count() >= max_keys {
            page.is_truncated = true;
            break;
        }
        page.last = Some(object.key.clone());
        page.contents.push(object);
    }

    page
}

/// Parse `max-keys`, clamped to [`MAX_KEYS`].
pub fn parse_max_keys(value: Option<&str>) -> Result<usize, ApiError> {
    match value {
        None | Some("") => Ok(MAX_KEYS),
        Some(v) => v
            .parse::<usize>()
            .map(|n| n.min(MAX_KEYS))
            .map_err(|_| {
                ApiError::bad_request(
                    "InvalidArgument",
                    "Provided max-keys not an integer or within integer range",
                )
            }),
    }
}

/// Opaque continuation token for a key.
#[must_use]
pub fn encode_token(key: &str) -> String {
    STANDARD.encode(key)
}

/// Key from a continuation token.
pub fn decode_token(token: &str) -> Result<String, ApiError> {
    STANDARD
        .decode(token)
        .ok()
        .and_then(|raw| String::from_utf8(raw).ok())
        .ok_or_else(|| {
            ApiError::bad_request("InvalidArgument", "The continuation token provided is incorrect")
        })
}
