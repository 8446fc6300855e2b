//! CloudWatch Logs integration tests.

#[cfg(test)]
mod tests {
    use crate::{logs_client, unique_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_manage_log_groups_and_streams() {
        let client = logs_client();
        let group = format!("/cloudmock/{}", unique_name("group"));

        client
            .create_log_group()
            .log_group_name(&group)
            .send()
            .await
            .expect("create_log_group");
        let err = client
            .create_log_group()
            .log_group_name(&group)
            .send()
            .await
            .expect_err("duplicate group");
        assert!(err.into_service_error().is_resource_already_exists_exception());

        client
            .create_log_stream()
            .log_group_name(&group)
            .log_stream_name("stream-1")
            .send()
            .await
            .expect("create_log_stream");
        let streams = client
            .describe_log_streams()
            .log_group_name(&group)
            .send()
            .await
            .expect("describe_log_streams");
        assert_eq!(streams.log_streams().len(), 1);
        assert_eq!(streams.log_streams()[0].log_stream_name(), Some("stream-1"));

        let groups = client
            .describe_log_groups()
            .log_group_name_prefix(&group)
            .send()
            .await
            .expect("describe_log_groups");
        let described = &groups.log_groups()[0];
        assert_eq!(described.log_group_name(), Some(group.as_str()));
        assert!(described.arn().is_some_and(|a| a.ends_with(":*")));

        client
            .delete_log_group()
            .log_group_name(&group)
            .send()
            .await
            .expect("delete_log_group");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_log_group_by_arn() {
        let client = logs_client();
        let group = unique_name("tagged");
        client
            .create_log_group()
            .log_group_name(&group)
            .send()
            .await
            .expect("create_log_group");

        let arn = format!("arn:aws:logs:us-east-1:000000000000:log-group:{group}");
        client
            .tag_resource()
            .resource_arn(&arn)
            .tags("team", "core")
            .send()
            .await
            .expect("tag_resource");
        let tags = client
            .list_tags_for_resource()
            .resource_arn(&arn)
            .send()
            .await
            .expect("list_tags_for_resource");
        assert_eq!(
            tags.tags().and_then(|t| t.get("team")).map(String::as_str),
            Some("core")
        );

        client
            .delete_log_group()
            .log_group_name(&group)
            .send()
            .await
            .ok();
    }
}
