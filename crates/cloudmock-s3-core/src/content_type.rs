//! Content-type detection for stored objects.

/// Pick a content type for an object: by key extension first, then by
/// sniffing the payload, then text-or-binary.
///
/// ```
/// use cloudmock_s3_core::content_type::detect_content_type;
///
/// assert_eq!(detect_content_type("data.json", b"{}"), "application/json");
/// assert_eq!(detect_content_type("notes", b"plain words"), "text/plain; charset=utf-8");
/// ```
#[must_use]
pub fn detect_content_type(key: &str, data: &[u8]) -> String {
    if let Some(mime) = mime_guess::from_path(key).first_raw() {
        return mime.to_owned();
    }
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_owned();
    }
    if looks_like_text(data) {
        mime::TEXT_PLAIN_UTF_8.to_string()
    } else {
        mime::APPLICATION_OCTET_STREAM.to_string()
    }
}

/// Valid UTF-8 without control bytes other than whitespace and escape.
fn looks_like_text(data: &[u8]) -> bool {
    std::str::from_utf8(data).is_ok()
        && !data.iter().any(|&b| {
            matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
        })
}
