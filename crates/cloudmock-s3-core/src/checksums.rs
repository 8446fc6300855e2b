//! Payload digests.

use md5::{Digest, Md5};

/// Unquoted hex MD5 of `data`.
///
/// ```
/// use cloudmock_s3_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Quoted hex MD5 of `data`, the ETag of a single-part object.
///
/// ```
/// use cloudmock_s3_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}
