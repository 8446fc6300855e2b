//! Generic ARN header parsing.

use std::{fmt, str::FromStr};

use crate::error::{ArnError, ArnResult};

/// Partition used for every ARN CloudMock builds.
pub const DEFAULT_PARTITION: &str = "aws";

const PREFIX: &str = "arn";

/// A parsed ARN: the five fixed header fields plus the uninterpreted resource.
///
/// ```
/// use cloudmock_arn::Arn;
///
/// let arn: Arn = "arn:aws:logs:us-east-1:000000000000:log-group:a:b:*".parse().unwrap();
/// assert_eq!(arn.service, "logs");
/// assert_eq!(arn.resource, "log-group:a:b:*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    /// Partition, normally `aws`.
    pub partition: String,
    /// Service namespace such as `s3` or `sns`.
    pub service: String,
    /// Region; empty for global services.
    pub region: String,
    /// Account id; empty for S3.
    pub account: String,
    /// Everything after the fifth `:`, verbatim.
    pub resource: String,
}

impl Arn {
    /// Parse the header fields, leaving colons inside the resource untouched.
    pub fn parse(input: &str) -> ArnResult<Self> {
        let mut parts = input.splitn(6, ':');
        if parts.next() != Some(PREFIX) {
            return Err(ArnError::invalid(input, "missing `arn:` prefix"));
        }
        let (Some(partition), Some(service), Some(region), Some(account), Some(resource)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(ArnError::invalid(input, "expected six `:`-separated fields"));
        };
        if partition.is_empty() {
            return Err(ArnError::invalid(input, "empty partition"));
        }
        if service.is_empty() {
            return Err(ArnError::invalid(input, "empty service"));
        }
        if resource.is_empty() {
            return Err(ArnError::invalid(input, "empty resource"));
        }
        Ok(Self {
            partition: partition.to_owned(),
            service: service.to_owned(),
            region: region.to_owned(),
            account: account.to_owned(),
            resource: resource.to_owned(),
        })
    }

    /// Parse and require a specific service.
    pub(crate) fn parse_service(input: &str, service: &str) -> ArnResult<Self> {
        let arn = Self::parse(input)?;
        if arn.service != service {
            return Err(ArnError::invalid(input, "unexpected service"));
        }
        Ok(arn)
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}
