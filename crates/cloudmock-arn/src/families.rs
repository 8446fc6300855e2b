//! Resource families built on top of [`Arn`].

use std::{fmt, str::FromStr};

use cloudmock_core::{AccountId, AwsRegion};

use crate::{
    arn::{Arn, DEFAULT_PARTITION},
    error::{ArnError, ArnResult},
};

const LOG_GROUP_MARKER: &str = "log-group:";
const LOG_STREAM_MARKER: &str = ":log-stream:";
const WILDCARD_SUFFIX: &str = ":*";

/// Families addressed as `arn:{p}:{service}:{region}:{account}:{marker}{name}`.
macro_rules! regional_family {
    ($(#[$meta:meta])* $ty:ident, $service:literal, $marker:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $ty {
            /// Partition, normally `aws`.
            pub partition: String,
            /// Region the resource lives in.
            pub region: String,
            /// Owning account.
            pub account: String,
            /// Resource name; may contain `:`.
            pub name: String,
        }

        impl $ty {
            /// Build an ARN in the default partition, region, and account.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self::with_location(AwsRegion::DEFAULT, AccountId::DEFAULT, name)
            }

            /// Build an ARN in the default partition.
            #[must_use]
            pub fn with_location(
                region: impl Into<String>,
                account: impl Into<String>,
                name: impl Into<String>,
            ) -> Self {
                Self {
                    partition: DEFAULT_PARTITION.to_owned(),
                    region: region.into(),
                    account: account.into(),
                    name: name.into(),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "arn:{}:{}:{}:{}:{}{}",
                    self.partition, $service, self.region, self.account, $marker, self.name
                )
            }
        }

        impl FromStr for $ty {
            type Err = ArnError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let arn = Arn::parse_service(s, $service)?;
                let name = arn
                    .resource
                    .strip_prefix($marker)
                    .ok_or_else(|| ArnError::invalid(s, "missing resource type marker"))?;
                if name.is_empty() {
                    return Err(ArnError::invalid(s, "empty resource name"));
                }
                Ok(Self {
                    name: name.to_owned(),
                    partition: arn.partition,
                    region: arn.region,
                    account: arn.account,
                })
            }
        }
    };
}

regional_family!(
    /// `arn:aws:sns:{region}:{account}:{topic}`
    TopicArn,
    "sns",
    ""
);
regional_family!(
    /// `arn:aws:sqs:{region}:{account}:{queue}`
    QueueArn,
    "sqs",
    ""
);
regional_family!(
    /// `arn:aws:dynamodb:{region}:{account}:table/{table}`
    TableArn,
    "dynamodb",
    "table/"
);
regional_family!(
    /// `arn:aws:lambda:{region}:{account}:function:{function}`
    FunctionArn,
    "lambda",
    "function:"
);

/// IAM principals: `arn:aws:iam::{account}:{marker}{name}`.
macro_rules! iam_family {
    ($(#[$meta:meta])* $ty:ident, $marker:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $ty {
            /// Partition, normally `aws`.
            pub partition: String,
            /// Owning account.
            pub account: String,
            /// Principal name including any path prefix.
            pub name: String,
        }

        impl $ty {
            /// Build an ARN in the default partition and account.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    partition: DEFAULT_PARTITION.to_owned(),
                    account: AccountId::DEFAULT.to_owned(),
                    name: name.into(),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "arn:{}:iam::{}:{}{}", self.partition, self.account, $marker, self.name)
            }
        }

        impl FromStr for $ty {
            type Err = ArnError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let arn = Arn::parse_service(s, "iam")?;
                if !arn.region.is_empty() {
                    return Err(ArnError::invalid(s, "IAM ARNs carry no region"));
                }
                let name = arn
                    .resource
                    .strip_prefix($marker)
                    .ok_or_else(|| ArnError::invalid(s, "missing resource type marker"))?;
                if name.is_empty() {
                    return Err(ArnError::invalid(s, "empty resource name"));
                }
                Ok(Self {
                    name: name.to_owned(),
                    partition: arn.partition,
                    account: arn.account,
                })
            }
        }
    };
}

iam_family!(
    /// `arn:aws:iam::{account}:role/{name}`
    RoleArn,
    "role/"
);
iam_family!(
    /// `arn:aws:iam::{account}:user/{name}`
    UserArn,
    "user/"
);

fn parse_s3(s: &str) -> ArnResult<Arn> {
    let arn = Arn::parse_service(s, "s3")?;
    if !arn.region.is_empty() || !arn.account.is_empty() {
        return Err(ArnError::invalid(s, "S3 ARNs carry no region or account"));
    }
    Ok(arn)
}

/// `arn:aws:s3:::{bucket}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketArn {
    /// Partition, normally `aws`.
    pub partition: String,
    /// Bucket name.
    pub bucket: String,
}

impl BucketArn {
    /// Build a bucket ARN in the default partition.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            partition: DEFAULT_PARTITION.to_owned(),
            bucket: bucket.into(),
        }
    }
}

impl fmt::Display for BucketArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arn:{}:s3:::{}", self.partition, self.bucket)
    }
}

impl FromStr for BucketArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = parse_s3(s)?;
        if arn.resource.contains('/') {
            return Err(ArnError::invalid(s, "object ARN where a bucket was expected"));
        }
        Ok(Self {
            partition: arn.partition,
            bucket: arn.resource,
        })
    }
}

/// `arn:aws:s3:::{bucket}/{key}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectArn {
    /// Partition, normally `aws`.
    pub partition: String,
    /// Bucket name.
    pub bucket: String,
    /// Object key; may contain `/` and `:`.
    pub key: String,
}

impl ObjectArn {
    /// Build an object ARN in the default partition.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            partition: DEFAULT_PARTITION.to_owned(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arn:{}:s3:::{}/{}", self.partition, self.bucket, self.key)
    }
}

impl FromStr for ObjectArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = parse_s3(s)?;
        let (bucket, key) = arn
            .resource
            .split_once('/')
            .ok_or_else(|| ArnError::invalid(s, "missing object key"))?;
        if bucket.is_empty() || key.is_empty() {
            return Err(ArnError::invalid(s, "empty bucket or key"));
        }
        Ok(Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            partition: arn.partition,
        })
    }
}

/// `arn:aws:logs:{region}:{account}:log-group:{name}`, optionally followed by
/// the `:*` wildcard that the logs API appends in some responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogGroupArn {
    /// Partition, normally `aws`.
    pub partition: String,
    /// Region the group lives in.
    pub region: String,
    /// Owning account.
    pub account: String,
    /// Log group name; may contain `:`.
    pub name: String,
    /// Whether the ARN carried (or should carry) a trailing `:*`.
    pub wildcard: bool,
}

impl LogGroupArn {
    /// Build a log group ARN without wildcard in the default location.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_location(AwsRegion::DEFAULT, AccountId::DEFAULT, name)
    }

    /// Build a log group ARN without wildcard.
    #[must_use]
    pub fn with_location(
        region: impl Into<String>,
        account: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            partition: DEFAULT_PARTITION.to_owned(),
            region: region.into(),
            account: account.into(),
            name: name.into(),
            wildcard: false,
        }
    }

    /// The same ARN with the wildcard flag set.
    #[must_use]
    pub fn with_wildcard(mut self, wildcard: bool) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// ARN of a stream inside this group.
    #[must_use]
    pub fn stream(&self, stream: impl Into<String>) -> LogStreamArn {
        LogStreamArn {
            partition: self.partition.clone(),
            region: self.region.clone(),
            account: self.account.clone(),
            group: self.name.clone(),
            stream: stream.into(),
        }
    }
}

impl fmt::Display for LogGroupArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:logs:{}:{}:{LOG_GROUP_MARKER}{}",
            self.partition, self.region, self.account, self.name
        )?;
        if self.wildcard {
            f.write_str(WILDCARD_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for LogGroupArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match LogsArn::from_str(s)? {
            LogsArn::Group(group) => Ok(group),
            LogsArn::Stream(_) => Err(ArnError::invalid(
                s,
                "log stream ARN where a log group was expected",
            )),
        }
    }
}

/// `arn:aws:logs:{region}:{account}:log-group:{group}:log-stream:{stream}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogStreamArn {
    /// Partition, normally `aws`.
    pub partition: String,
    /// Region the group lives in.
    pub region: String,
    /// Owning account.
    pub account: String,
    /// Log group name; may contain `:`.
    pub group: String,
    /// Log stream name; may contain `:`.
    pub stream: String,
}

impl LogStreamArn {
    /// The ARN of the enclosing log group, without wildcard.
    #[must_use]
    pub fn group_arn(&self) -> LogGroupArn {
        LogGroupArn {
            partition: self.partition.clone(),
            region: self.region.clone(),
            account: self.account.clone(),
            name: self.group.clone(),
            wildcard: false,
        }
    }
}

impl fmt::Display for LogStreamArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:logs:{}:{}:{LOG_GROUP_MARKER}{}{LOG_STREAM_MARKER}{}",
            self.partition, self.region, self.account, self.group, self.stream
        )
    }
}

impl FromStr for LogStreamArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match LogsArn::from_str(s)? {
            LogsArn::Stream(stream) => Ok(stream),
            LogsArn::Group(_) => Err(ArnError::invalid(s, "missing `:log-stream:` marker")),
        }
    }
}

/// Either kind of logs ARN, chosen by the presence of `:log-stream:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogsArn {
    /// A log group, possibly with wildcard.
    Group(LogGroupArn),
    /// A log stream.
    Stream(LogStreamArn),
}

impl FromStr for LogsArn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arn = Arn::parse_service(s, "logs")?;
        let rest = arn
            .resource
            .strip_prefix(LOG_GROUP_MARKER)
            .ok_or_else(|| ArnError::invalid(s, "missing `log-group:` marker"))?;

        if let Some(idx) = rest.rfind(LOG_STREAM_MARKER) {
            let group = &rest[..idx];
            let stream = &rest[idx + LOG_STREAM_MARKER.len()..];
            if group.is_empty() || stream.is_empty() {
                return Err(ArnError::invalid(s, "empty log group or stream name"));
            }
            return Ok(Self::Stream(LogStreamArn {
                group: group.to_owned(),
                stream: stream.to_owned(),
                partition: arn.partition,
                region: arn.region,
                account: arn.account,
            }));
        }

        let (name, wildcard) = match rest.strip_suffix(WILDCARD_SUFFIX) {
            Some(name) => (name, true),
            None => (rest, false),
        };
        if name.is_empty() {
            return Err(ArnError::invalid(s, "empty log group name"));
        }
        Ok(Self::Group(LogGroupArn {
            name: name.to_owned(),
            wildcard,
            partition: arn.partition,
            region: arn.region,
            account: arn.account,
        }))
    }
}

impl fmt::Display for LogsArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => group.fmt(f),
            Self::Stream(stream) => stream.fmt(f),
        }
    }
}
