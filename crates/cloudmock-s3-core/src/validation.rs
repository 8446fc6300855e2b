//! Bucket name and object key rules.

use std::net::Ipv4Addr;

use crate::error::DataPlaneError;

const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;
const MAX_KEY_BYTES: usize = 1024;

fn invalid(name: &str, reason: &str) -> DataPlaneError {
    DataPlaneError::InvalidBucketName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Validate a bucket name against the S3 naming rules: 3-63 characters of
/// lowercase letters, digits, `-` and `.`, starting and ending alphanumeric,
/// no `..`, and not shaped like an IPv4 address.
///
/// ```
/// use cloudmock_s3_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-valid-bucket").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), DataPlaneError> {
    let len = name.len();
    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(invalid(
            name,
            "Bucket name must be between 3 and 63 characters long",
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            name,
            "Bucket name must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let bytes = name.as_bytes();
    let alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !alnum(bytes[0]) || !alnum(bytes[len - 1]) {
        return Err(invalid(
            name,
            "Bucket name must start and end with a letter or number",
        ));
    }

    if name.contains("..") {
        return Err(invalid(name, "Bucket name must not contain consecutive dots"));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid(
            name,
            "Bucket name must not be formatted as an IP address",
        ));
    }

    Ok(())
}

/// Validate an object key: 1-1024 bytes.
pub fn validate_object_key(key: &str) -> Result<(), DataPlaneError> {
    if key.is_empty() {
        return Err(DataPlaneError::InvalidKey {
            reason: "Object key must not be empty",
        });
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(DataPlaneError::InvalidKey {
            reason: "Object key must not exceed 1024 bytes",
        });
    }
    Ok(())
}
