//! S3 bucket and object integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::{error::ProvideErrorMetadata, primitives::ByteStream};

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "putget").await;

        let body = b"hello, cloudmock!";
        let put = client
            .put_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .body(ByteStream::from_static(body))
            .content_type("text/plain")
            .send()
            .await
            .expect("put_object");
        assert!(put.e_tag().is_some_and(|e| e.starts_with('"')));

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .send()
            .await
            .expect("get_object");
        assert_eq!(resp.content_type(), Some("text/plain"));
        assert_eq!(resp.e_tag(), put.e_tag());

        let data = resp
            .body
            .collect()
            .await
            .expect("collect body")
            .into_bytes();
        assert_eq!(data.as_ref(), body);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_head_and_delete_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "head").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("a/b.bin")
            .body(ByteStream::from_static(&[0u8; 32]))
            .send()
            .await
            .expect("put_object");

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("a/b.bin")
            .send()
            .await
            .expect("head_object");
        assert_eq!(head.content_length(), Some(32));

        client
            .delete_object()
            .bucket(&bucket)
            .key("a/b.bin")
            .send()
            .await
            .expect("delete_object");
        let err = client
            .get_object()
            .bucket(&bucket)
            .key("a/b.bin")
            .send()
            .await
            .expect_err("object should be gone");
        assert!(err.into_service_error().is_no_such_key());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_objects_with_delimiter() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "list").await;

        for key in ["docs/a.txt", "docs/b.txt", "img/c.png", "root.txt"] {
            client
                .put_object()
                .bucket(&bucket)
                .key(key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .expect("put_object");
        }

        let resp = client
            .list_objects_v2()
            .bucket(&bucket)
            .delimiter("/")
            .send()
            .await
            .expect("list_objects_v2");
        let keys: Vec<_> = resp.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, vec!["root.txt"]);
        let prefixes: Vec<_> = resp
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .collect();
        assert_eq!(prefixes, vec!["docs/", "img/"]);

        let page = client
            .list_objects_v2()
            .bucket(&bucket)
            .max_keys(2)
            .send()
            .await
            .expect("list_objects_v2");
        assert_eq!(page.is_truncated(), Some(true));
        let rest = client
            .list_objects_v2()
            .bucket(&bucket)
            .continuation_token(page.next_continuation_token().unwrap_or_default())
            .send()
            .await
            .expect("list_objects_v2");
        assert_eq!(rest.contents().len(), 2);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_object_in_missing_bucket() {
        let client = s3_client();
        let err = client
            .put_object()
            .bucket("no-such-bucket-cloudmock")
            .key("k")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect_err("bucket does not exist");
        let code = err.into_service_error().code().map(ToOwned::to_owned);
        assert_eq!(code.as_deref(), Some("NoSuchBucket"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_list_buckets() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "buckets").await;

        client
            .head_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("head_bucket");
        let listed = client.list_buckets().send().await.expect("list_buckets");
        assert!(listed.buckets().iter().any(|b| b.name() == Some(bucket.as_str())));

        cleanup_bucket(&client, &bucket).await;
        assert!(client.head_bucket().bucket(&bucket).send().await.is_err());
    }
}
