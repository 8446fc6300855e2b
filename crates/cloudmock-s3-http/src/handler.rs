//! The S3 REST handler.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use cloudmock_core::{AccountId, Namespace};
use cloudmock_gateway::{
    ApiError, HandlerFuture, RequestContext, ResponseBody, RestHandler, RestRequest, XmlElement,
    response::{APPLICATION_XML, xml_response},
    xml::to_text_document,
};
use cloudmock_s3_core::{ObjectAttributes, ObjectDataPlane};
use http::{HeaderName, HeaderValue, Response, StatusCode, header};
use tracing::debug;

use crate::{
    error::s3_error,
    listing::{decode_token, encode_token, paginate, parse_max_keys},
    operation::{S3Operation, identify},
};

/// Namespace of S3 XML documents.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Region whose location constraint is reported as empty.
const CLASSIC_REGION: &str = "us-east-1";

/// Serves S3 requests from the object data-plane.
#[derive(Debug, Clone)]
pub struct S3Handler {
    plane: Arc<ObjectDataPlane>,
}

impl S3Handler {
    /// Wrap a data-plane.
    #[must_use]
    pub fn new(plane: Arc<ObjectDataPlane>) -> Self {
        Self { plane }
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        req: RestRequest,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let op = identify(
            &req.method,
            req.container.is_some(),
            req.key.is_some(),
            &req.query,
            &req.headers,
        )?;
        debug!(operation = %op, "identified S3 operation");

        let ns = &ctx.namespace;
        let bucket = req.container.as_deref().unwrap_or_default();
        let key = req.key.as_deref().unwrap_or_default();

        match op {
            S3Operation::ListBuckets => self.list_buckets(ns).await,
            S3Operation::CreateBucket => self.create_bucket(ns, bucket).await,
            S3Operation::HeadBucket => self.head_bucket(ns, bucket).await,
            S3Operation::DeleteBucket => self.delete_bucket(ns, bucket).await,
            S3Operation::GetBucketLocation => self.get_bucket_location(ns, bucket).await,
            S3Operation::ListObjects => self.list_objects(ns, bucket, &req, false).await,
            S3Operation::ListObjectsV2 => self.list_objects(ns, bucket, &req, true).await,
            S3Operation::PutObject => self.put_object(ns, bucket, key, &req).await,
            S3Operation::GetObject => self.get_object(ns, bucket, key).await,
            S3Operation::HeadObject => self.head_object(ns, bucket, key).await,
            S3Operation::DeleteObject => self.delete_object(ns, bucket, key).await,
            other => Err(ApiError::not_implemented(other.as_str())),
        }
    }

    async fn list_buckets(&self, ns: &Namespace) -> Result<Response<ResponseBody>, ApiError> {
        let buckets = self.plane.list_buckets(ns).await.map_err(|e| s3_error(&e))?;
        let buckets = buckets
            .into_iter()
            .map(|b| {
                XmlElement::parent(
                    "Bucket",
                    vec![
                        XmlElement::text("Name", b.attributes.name),
                        XmlElement::text("CreationDate", iso8601(&b.created_at)),
                    ],
                )
            })
            .collect();
        Ok(s3_xml(
            "ListAllMyBucketsResult",
            &[
                XmlElement::parent(
                    "Owner",
                    vec![
                        XmlElement::text("ID", AccountId::DEFAULT),
                        XmlElement::text("DisplayName", "cloudmock"),
                    ],
                ),
                XmlElement::parent("Buckets", buckets),
            ],
        ))
    }

    async fn create_bucket(
        &self,
        ns: &Namespace,
        bucket: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        self.plane
            .create_bucket(ns, bucket)
            .await
            .map_err(|e| s3_error(&e))?;
        let mut response = empty(StatusCode::OK);
        insert(&mut response, header::LOCATION, &format!("/{bucket}"));
        Ok(response)
    }

    async fn head_bucket(
        &self,
        ns: &Namespace,
        bucket: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let found = self
            .plane
            .head_bucket(ns, bucket)
            .await
            .map_err(|e| s3_error(&e))?;
        let mut response = empty(StatusCode::OK);
        insert(
            &mut response,
            HeaderName::from_static("x-amz-bucket-region"),
            &found.attributes.region,
        );
        Ok(response)
    }

    async fn delete_bucket(
        &self,
        ns: &Namespace,
        bucket: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        self.plane
            .delete_bucket(ns, bucket)
            .await
            .map_err(|e| s3_error(&e))?;
        Ok(empty(StatusCode::NO_CONTENT))
    }

    async fn get_bucket_location(
        &self,
        ns: &Namespace,
        bucket: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let found = self
            .plane
            .head_bucket(ns, bucket)
            .await
            .map_err(|e| s3_error(&e))?;
        let region = found.attributes.region.as_str();
        let constraint = if region == CLASSIC_REGION { "" } else { region };
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, APPLICATION_XML)
            .body(ResponseBody::from_bytes(to_text_document(
                "LocationConstraint",
                Some(S3_NAMESPACE),
                constraint,
            )))
            .expect("valid XML response"))
    }

    async fn list_objects(
        &self,
        ns: &Namespace,
        bucket: &str,
        req: &RestRequest,
        v2: bool,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let prefix = req.query.get("prefix").unwrap_or_default();
        let delimiter = req.query.get_non_empty("delimiter");
        let max_keys = parse_max_keys(req.query.get("max-keys"))?;

        let continuation = req.query.get_non_empty("continuation-token");
        let start_after = req.query.get_non_empty("start-after");
        let marker = req.query.get_non_empty("marker");
        let after = if v2 {
            match continuation {
                Some(token) => Some(decode_token(token)?),
                None => start_after.map(str::to_owned),
            }
        } else {
            marker.map(str::to_owned)
        };

        let objects = self
            .plane
            .list_objects(ns, bucket, Some(prefix))
            .await
            .map_err(|e| s3_error(&e))?;
        let page = paginate(objects, prefix, delimiter, after.as_deref(), max_keys);

        let mut fields = vec![
            XmlElement::text("Name", bucket),
            XmlElement::text("Prefix", prefix),
        ];
        if v2 {
            fields.push(XmlElement::text("MaxKeys", max_keys.to_string()));
            fields.push(XmlElement::text("KeyCount", page.key_count().to_string()));
            fields.extend(XmlElement::optional("Delimiter", delimiter));
            fields.push(XmlElement::text("IsTruncated", page.is_truncated.to_string()));
            fields.extend(XmlElement::optional("ContinuationToken", continuation));
            if page.is_truncated {
                fields.extend(XmlElement::optional(
                    "NextContinuationToken",
                    page.last.as_deref().map(encode_token),
                ));
            }
            fields.extend(XmlElement::optional("StartAfter", start_after));
        } else {
            fields.push(XmlElement::text("Marker", marker.unwrap_or_default()));
            fields.push(XmlElement::text("MaxKeys", max_keys.to_string()));
            fields.extend(XmlElement::optional("Delimiter", delimiter));
            fields.push(XmlElement::text("IsTruncated", page.is_truncated.to_string()));
            if page.is_truncated {
                fields.extend(XmlElement::optional("NextMarker", page.last.clone()));
            }
        }
        fields.extend(page.contents.iter().map(object_entry));
        fields.extend(page.common_prefixes.into_iter().map(|p| {
            XmlElement::parent("CommonPrefixes", vec![XmlElement::text("Prefix", p)])
        }));

        Ok(s3_xml("ListBucketResult", &fields))
    }

    async fn put_object(
        &self,
        ns: &Namespace,
        bucket: &str,
        key: &str,
        req: &RestRequest,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let content_type = req.header(header::CONTENT_TYPE.as_str());
        let stored = self
            .plane
            .put(ns, bucket, key, req.body.clone(), content_type)
            .await
            .map_err(|e| s3_error(&e))?;
        let mut response = empty(StatusCode::OK);
        insert(&mut response, header::ETAG, &stored.etag);
        Ok(response)
    }

    async fn get_object(
        &self,
        ns: &Namespace,
        bucket: &str,
        key: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let object = self
            .plane
            .get(ns, bucket, key)
            .await
            .map_err(|e| s3_error(&e))?;
        Ok(object_response(&object.metadata, object.body))
    }

    async fn head_object(
        &self,
        ns: &Namespace,
        bucket: &str,
        key: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        let metadata = self
            .plane
            .head(ns, bucket, key)
            .await
            .map_err(|e| s3_error(&e))?;
        let mut response = object_response(&metadata, Bytes::new());
        *response.body_mut() = ResponseBody::empty();
        insert(&mut response, header::CONTENT_LENGTH, &metadata.size.to_string());
        Ok(response)
    }

    async fn delete_object(
        &self,
        ns: &Namespace,
        bucket: &str,
        key: &str,
    ) -> Result<Response<ResponseBody>, ApiError> {
        self.plane
            .delete(ns, bucket, key)
            .await
            .map_err(|e| s3_error(&e))?;
        Ok(empty(StatusCode::NO_CONTENT))
    }
}

impl RestHandler for S3Handler {
    fn service_name(&self) -> &'static str {
        "s3"
    }

    fn handle(
        &self,
        ctx: RequestContext,
        request: RestRequest,
    ) -> HandlerFuture<Response<ResponseBody>> {
        let handler = self.clone();
        Box::pin(async move { handler.dispatch(&ctx, request).await })
    }
}

fn s3_xml(root: &str, children: &[XmlElement]) -> Response<ResponseBody> {
    xml_response(StatusCode::OK, APPLICATION_XML, root, Some(S3_NAMESPACE), children)
}

fn empty(status: StatusCode) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .body(ResponseBody::empty())
        .expect("valid empty response")
}

fn insert(response: &mut Response<ResponseBody>, name: HeaderName, value: &str) {
    if let Ok(hv) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, hv);
    }
}

fn object_entry(object: &ObjectAttributes) -> XmlElement {
    XmlElement::parent(
        "Contents",
        vec![
            XmlElement::text("Key", object.key.as_str()),
            XmlElement::text("LastModified", iso8601(&object.last_modified)),
            XmlElement::text("ETag", object.etag.as_str()),
            XmlElement::text("Size", object.size.to_string()),
            XmlElement::text("StorageClass", "STANDARD"),
        ],
    )
}

fn object_response(metadata: &ObjectAttributes, body: Bytes) -> Response<ResponseBody> {
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .body(ResponseBody::from_bytes(body))
        .expect("valid object response");
    insert(&mut response, header::ETAG, &metadata.etag);
    insert(&mut response, header::CONTENT_TYPE, &metadata.content_type);
    insert(&mut response, header::LAST_MODIFIED, &http_date(&metadata.last_modified));
    insert(&mut response, header::ACCEPT_RANGES, "bytes");
    response
}

fn iso8601(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
