//! Namespace isolation over raw HTTP.

#[cfg(test)]
mod tests {
    use crate::{NAMESPACE_HEADER, endpoint_url, unique_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_isolate_buckets_by_namespace() {
        let http = reqwest::Client::new();
        let bucket = unique_name("ns");
        let url = format!("{}/{bucket}", endpoint_url());

        let created = http
            .put(&url)
            .header(NAMESPACE_HEADER, "tenant-a")
            .send()
            .await
            .expect("create bucket");
        assert_eq!(created.status(), 200);

        let own = http
            .head(&url)
            .header(NAMESPACE_HEADER, "tenant-a")
            .send()
            .await
            .expect("head bucket");
        assert_eq!(own.status(), 200);

        let other = http
            .head(&url)
            .header(NAMESPACE_HEADER, "tenant-b")
            .send()
            .await
            .expect("head bucket");
        assert_eq!(other.status(), 404);

        http.delete(&url)
            .header(NAMESPACE_HEADER, "tenant-a")
            .send()
            .await
            .expect("delete bucket");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health() {
        let resp = reqwest::get(format!("{}/_localstack/health", endpoint_url()))
            .await
            .expect("health");
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.expect("json body");
        assert_eq!(body["services"]["s3"], "running");
    }
}
