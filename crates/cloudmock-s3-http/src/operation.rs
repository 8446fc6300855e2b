//! S3 operation identification from method, path shape, and sub-resource
//! parameters.
//!
//! Sub-resources are matched by parameter *presence* (`?location` has an
//! empty value), checked in table order; the first hit wins.

use cloudmock_gateway::{ApiError, QueryParams};
use http::{HeaderMap, Method, StatusCode};

macro_rules! s3_operations {
    ($($name:ident),+ $(,)?) => {
        /// Every S3 operation the router can name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum S3Operation {
            $(
                #[doc = concat!("The ", stringify!($name), " operation.")]
                $name,
            )+
        }

        impl S3Operation {
            /// The operation name as AWS spells it.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }
        }
    };
}

s3_operations! {
    ListBuckets,
    CreateBucket,
    DeleteBucket,
    HeadBucket,
    GetBucketLocation,
    ListObjects,
    ListObjectsV2,
    ListObjectVersions,
    ListMultipartUploads,
    GetBucketVersioning,
    PutBucketVersioning,
    GetBucketEncryption,
    PutBucketEncryption,
    DeleteBucketEncryption,
    GetBucketCors,
    PutBucketCors,
    DeleteBucketCors,
    GetBucketLifecycleConfiguration,
    PutBucketLifecycleConfiguration,
    DeleteBucketLifecycle,
    GetBucketPolicy,
    PutBucketPolicy,
    DeleteBucketPolicy,
    GetBucketPolicyStatus,
    GetBucketTagging,
    PutBucketTagging,
    DeleteBucketTagging,
    GetBucketNotificationConfiguration,
    PutBucketNotificationConfiguration,
    GetBucketLogging,
    PutBucketLogging,
    GetPublicAccessBlock,
    PutPublicAccessBlock,
    DeletePublicAccessBlock,
    GetBucketOwnershipControls,
    PutBucketOwnershipControls,
    DeleteBucketOwnershipControls,
    GetObjectLockConfiguration,
    PutObjectLockConfiguration,
    GetBucketAccelerateConfiguration,
    PutBucketAccelerateConfiguration,
    GetBucketRequestPayment,
    PutBucketRequestPayment,
    GetBucketWebsite,
    PutBucketWebsite,
    DeleteBucketWebsite,
    GetBucketAcl,
    PutBucketAcl,
    DeleteObjects,
    PostObject,
    GetObject,
    PutObject,
    HeadObject,
    DeleteObject,
    CopyObject,
    GetObjectTagging,
    PutObjectTagging,
    DeleteObjectTagging,
    GetObjectAcl,
    PutObjectAcl,
    GetObjectRetention,
    PutObjectRetention,
    GetObjectLegalHold,
    PutObjectLegalHold,
    GetObjectAttributes,
    CreateMultipartUpload,
    UploadPart,
    UploadPartCopy,
    CompleteMultipartUpload,
    AbortMultipartUpload,
    ListParts,
}

impl S3Operation {
    /// Whether the emulator implements this operation.
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            Self::ListBuckets
                | Self::CreateBucket
                | Self::HeadBucket
                | Self::DeleteBucket
                | Self::GetBucketLocation
                | Self::ListObjects
                | Self::ListObjectsV2
                | Self::PutObject
                | Self::GetObject
                | Self::HeadObject
                | Self::DeleteObject
        )
    }
}

impl std::fmt::Display for S3Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type SubResources = &'static [(&'static str, S3Operation)];

const BUCKET_GET: SubResources = &[
    ("location", S3Operation::GetBucketLocation),
    ("versioning", S3Operation::GetBucketVersioning),
    ("encryption", S3Operation::GetBucketEncryption),
    ("cors", S3Operation::GetBucketCors),
    ("lifecycle", S3Operation::GetBucketLifecycleConfiguration),
    ("policy", S3Operation::GetBucketPolicy),
    ("tagging", S3Operation::GetBucketTagging),
    ("notification", S3Operation::GetBucketNotificationConfiguration),
    ("logging", S3Operation::GetBucketLogging),
    ("publicAccessBlock", S3Operation::GetPublicAccessBlock),
    ("ownershipControls", S3Operation::GetBucketOwnershipControls),
    ("object-lock", S3Operation::GetObjectLockConfiguration),
    ("accelerate", S3Operation::GetBucketAccelerateConfiguration),
    ("requestPayment", S3Operation::GetBucketRequestPayment),
    ("website", S3Operation::GetBucketWebsite),
    ("acl", S3Operation::GetBucketAcl),
    ("policyStatus", S3Operation::GetBucketPolicyStatus),
    ("uploads", S3Operation::ListMultipartUploads),
    ("versions", S3Operation::ListObjectVersions),
];

const BUCKET_PUT: SubResources = &[
    ("versioning", S3Operation::PutBucketVersioning),
    ("encryption", S3Operation::PutBucketEncryption),
    ("cors", S3Operation::PutBucketCors),
    ("lifecycle", S3Operation::PutBucketLifecycleConfiguration),
    ("policy", S3Operation::PutBucketPolicy),
    ("tagging", S3Operation::PutBucketTagging),
    ("notification", S3Operation::PutBucketNotificationConfiguration),
    ("logging", S3Operation::PutBucketLogging),
    ("publicAccessBlock", S3Operation::PutPublicAccessBlock),
    ("ownershipControls", S3Operation::PutBucketOwnershipControls),
    ("object-lock", S3Operation::PutObjectLockConfiguration),
    ("accelerate", S3Operation::PutBucketAccelerateConfiguration),
    ("requestPayment", S3Operation::PutBucketRequestPayment),
    ("website", S3Operation::PutBucketWebsite),
    ("acl", S3Operation::PutBucketAcl),
];

const BUCKET_DELETE: SubResources = &[
    ("encryption", S3Operation::DeleteBucketEncryption),
    ("cors", S3Operation::DeleteBucketCors),
    ("lifecycle", S3Operation::DeleteBucketLifecycle),
    ("policy", S3Operation::DeleteBucketPolicy),
    ("tagging", S3Operation::DeleteBucketTagging),
    ("publicAccessBlock", S3Operation::DeletePublicAccessBlock),
    ("ownershipControls", S3Operation::DeleteBucketOwnershipControls),
    ("website", S3Operation::DeleteBucketWebsite),
];

const OBJECT_GET: SubResources = &[
    ("tagging", S3Operation::GetObjectTagging),
    ("acl", S3Operation::GetObjectAcl),
    ("retention", S3Operation::GetObjectRetention),
    ("legal-hold", S3Operation::GetObjectLegalHold),
    ("attributes", S3Operation::GetObjectAttributes),
    ("uploadId", S3Operation::ListParts),
];

const OBJECT_PUT: SubResources = &[
    ("tagging", S3Operation::PutObjectTagging),
    ("acl", S3Operation::PutObjectAcl),
    ("retention", S3Operation::PutObjectRetention),
    ("legal-hold", S3Operation::PutObjectLegalHold),
];

const OBJECT_DELETE: SubResources = &[
    ("tagging", S3Operation::DeleteObjectTagging),
    ("uploadId", S3Operation::AbortMultipartUpload),
];

fn lookup(table: SubResources, query: &QueryParams, default: S3Operation) -> S3Operation {
    table
        .iter()
        .find(|(param, _)| query.contains(param))
        .map_or(default, |(_, op)| *op)
}

/// The `405 MethodNotAllowed` error.
#[must_use]
pub fn method_not_allowed(method: &Method) -> ApiError {
    ApiError::new(
        "MethodNotAllowed",
        StatusCode::METHOD_NOT_ALLOWED,
        format!("The specified method {method} is not allowed against this resource."),
    )
}

/// Identify the operation of a path-style request.
pub fn identify(
    method: &Method,
    has_bucket: bool,
    has_key: bool,
    query: &QueryParams,
    headers: &HeaderMap,
) -> Result<S3Operation, ApiError> {
    match (has_bucket, has_key) {
        (false, _) if *method == Method::GET => Ok(S3Operation::ListBuckets),
        (false, _) => Err(method_not_allowed(method)),
        (true, false) => identify_bucket(method, query),
        (true, true) => identify_object(method, query, headers),
    }
}

fn identify_bucket(method: &Method, query: &QueryParams) -> Result<S3Operation, ApiError> {
    match *method {
        Method::GET if query.get("list-type") == Some("2") => Ok(S3Operation::ListObjectsV2),
        Method::GET => Ok(lookup(BUCKET_GET, query, S3Operation::ListObjects)),
        Method::PUT => Ok(lookup(BUCKET_PUT, query, S3Operation::CreateBucket)),
        Method::DELETE => Ok(lookup(BUCKET_DELETE, query, S3Operation::DeleteBucket)),
        Method::HEAD => Ok(S3Operation::HeadBucket),
        Method::POST if query.contains("delete") => Ok(S3Operation::DeleteObjects),
        Method::POST => Ok(S3Operation::PostObject),
        _ => Err(method_not_allowed(method)),
    }
}

fn identify_object(
    method: &Method,
    query: &QueryParams,
    headers: &HeaderMap,
) -> Result<S3Operation, ApiError> {
    let copy = headers.contains_key("x-amz-copy-source");
    match *method {
        Method::GET => Ok(lookup(OBJECT_GET, query, S3Operation::GetObject)),
        Method::PUT => {
            let default = match (query.contains("partNumber") && query.contains("uploadId"), copy) {
                (true, true) => S3Operation::UploadPartCopy,
                (true, false) => S3Operation::UploadPart,
                (false, true) => S3Operation::CopyObject,
                (false, false) => S3Operation::PutObject,
            };
            Ok(lookup(OBJECT_PUT, query, default))
        }
        Method::DELETE => Ok(lookup(OBJECT_DELETE, query, S3Operation::DeleteObject)),
        Method::HEAD => Ok(S3Operation::HeadObject),
        Method::POST if query.contains("uploads") => Ok(S3Operation::CreateMultipartUpload),
        Method::POST if query.contains("uploadId") => Ok(S3Operation::CompleteMultipartUpload),
        _ => Err(method_not_allowed(method)),
    }
}
