//! Common type definitions shared across services.

use std::fmt;

use serde::{Deserialize, Serialize};

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Account ID reported for every caller.
    pub const DEFAULT: &str = "000000000000";

    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is not a 12-digit numeric string.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::CoreError> {
        let id = id.into();
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(crate::CoreError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Region used when a request does not name one.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tenant partition key. Every stored resource and every object payload
/// belongs to exactly one namespace.
///
/// Requests without a namespace header (or with an empty one) land in the
/// literal `"undefined"` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Namespace assigned to requests that do not carry one.
    pub const UNDEFINED: &str = "undefined";

    /// Create a namespace from a raw value. Blank values map to
    /// [`Namespace::UNDEFINED`].
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::undefined()
        } else {
            Self(value)
        }
    }

    /// The namespace used for requests without a namespace header.
    #[must_use]
    pub fn undefined() -> Self {
        Self(Self::UNDEFINED.to_owned())
    }

    /// Resolve the namespace from an optional header value.
    #[must_use]
    pub fn from_header(value: Option<&str>) -> Self {
        value.map_or_else(Self::undefined, Self::new)
    }

    /// Get the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the fallback namespace.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.0 == Self::UNDEFINED
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request signing scheme detected from the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// `AWS4-HMAC-SHA256 Credential=...`
    SigV4,
    /// Legacy `AWS AKID:signature`.
    SigV2,
}

/// Caller identity derived from the request. Signatures are never verified;
/// the identity is informational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Identity {
    /// No recognizable signature was present.
    #[default]
    Anonymous,
    /// The request carried a signature naming this access key.
    Signed {
        /// Access key id from the credential scope.
        access_key_id: String,
        /// The signing scheme.
        scheme: SignatureScheme,
    },
}

impl Identity {
    /// The access key id, if the request was signed.
    #[must_use]
    pub fn access_key_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Signed { access_key_id, .. } => Some(access_key_id),
        }
    }

    /// Whether the request was signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_valid_account_id() {
        let id = AccountId::new("123456789012").unwrap();
        assert_eq!(id.as_str(), "123456789012");
    }

    #[test]
    fn test_should_reject_invalid_account_id() {
        assert!(AccountId::new("12345").is_err());
        assert!(AccountId::new("abcdefghijkl").is_err());
        assert!(AccountId::new("1234567890123").is_err());
    }

    #[test]
    fn test_should_use_default_account_and_region() {
        assert_eq!(AccountId::default().as_str(), "000000000000");
        assert_eq!(AwsRegion::default().as_str(), "us-east-1");
    }

    #[test]
    fn test_should_map_missing_namespace_to_undefined() {
        assert_eq!(Namespace::from_header(None).as_str(), "undefined");
        assert_eq!(Namespace::from_header(Some("")).as_str(), "undefined");
        assert_eq!(Namespace::from_header(Some("   ")).as_str(), "undefined");
        assert!(Namespace::default().is_undefined());
    }

    #[test]
    fn test_should_keep_explicit_namespace() {
        let ns = Namespace::from_header(Some("tenant-a"));
        assert_eq!(ns.as_str(), "tenant-a");
        assert!(!ns.is_undefined());
        assert_eq!(ns.to_string(), "tenant-a");
    }

    #[test]
    fn test_should_expose_access_key_of_signed_identity() {
        let identity = Identity::Signed {
            access_key_id: "AKIDEXAMPLE".to_owned(),
            scheme: SignatureScheme::SigV4,
        };
        assert_eq!(identity.access_key_id(), Some("AKIDEXAMPLE"));
        assert!(identity.is_signed());
        assert_eq!(Identity::Anonymous.access_key_id(), None);
    }
}
