//! Amazon Resource Name codec for CloudMock.
//!
//! Parsing is two-phase. [`Arn`] splits the five fixed header fields
//! (`arn`, partition, service, region, account) and keeps the remainder as an
//! opaque resource string, so resource names may contain `:`. Each resource
//! family then interprets that remainder with its own markers.
//!
//! Every family implements [`std::fmt::Display`] (build) and
//! [`std::str::FromStr`] (parse), and `parse(build(x)) == x` holds for any
//! name that does not itself contain the family's markers.

mod arn;
mod error;
mod families;

pub use arn::{Arn, DEFAULT_PARTITION};
pub use error::{ArnError, ArnResult};
pub use families::{
    BucketArn, FunctionArn, LogGroupArn, LogStreamArn, LogsArn, ObjectArn, QueueArn, RoleArn,
    TableArn, TopicArn, UserArn,
};
