//! SNS topic integration tests.

#[cfg(test)]
mod tests {
    use crate::{sns_client, unique_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_topic_idempotently() {
        let client = sns_client();
        let name = unique_name("topic");

        let first = client
            .create_topic()
            .name(&name)
            .send()
            .await
            .expect("create_topic");
        let second = client
            .create_topic()
            .name(&name)
            .send()
            .await
            .expect("create_topic again");
        assert_eq!(first.topic_arn(), second.topic_arn());
        let arn = first.topic_arn().expect("topic arn").to_owned();
        assert!(arn.ends_with(&format!(":{name}")));

        let listed = client.list_topics().send().await.expect("list_topics");
        assert!(listed.topics().iter().any(|t| t.topic_arn() == Some(arn.as_str())));

        client
            .delete_topic()
            .topic_arn(&arn)
            .send()
            .await
            .expect("delete_topic");
        client
            .delete_topic()
            .topic_arn(&arn)
            .send()
            .await
            .expect("delete_topic is idempotent");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_set_and_get_topic_attributes() {
        let client = sns_client();
        let arn = client
            .create_topic()
            .name(unique_name("attrs"))
            .send()
            .await
            .expect("create_topic")
            .topic_arn()
            .expect("topic arn")
            .to_owned();

        client
            .set_topic_attributes()
            .topic_arn(&arn)
            .attribute_name("DisplayName")
            .attribute_value("Orders")
            .send()
            .await
            .expect("set_topic_attributes");
        let attrs = client
            .get_topic_attributes()
            .topic_arn(&arn)
            .send()
            .await
            .expect("get_topic_attributes");
        let attrs = attrs.attributes().expect("attributes");
        assert_eq!(attrs.get("DisplayName").map(String::as_str), Some("Orders"));
        assert_eq!(attrs.get("TopicArn"), Some(&arn));

        client.delete_topic().topic_arn(&arn).send().await.ok();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_topic() {
        let client = sns_client();
        let arn = client
            .create_topic()
            .name(unique_name("tags"))
            .send()
            .await
            .expect("create_topic")
            .topic_arn()
            .expect("topic arn")
            .to_owned();

        let tag = aws_sdk_sns::types::Tag::builder()
            .key("env")
            .value("dev")
            .build()
            .expect("tag");
        client
            .tag_resource()
            .resource_arn(&arn)
            .tags(tag)
            .send()
            .await
            .expect("tag_resource");
        let tags = client
            .list_tags_for_resource()
            .resource_arn(&arn)
            .send()
            .await
            .expect("list_tags_for_resource");
        assert_eq!(tags.tags().len(), 1);
        assert_eq!(tags.tags()[0].key(), "env");

        client.delete_topic().topic_arn(&arn).send().await.ok();
    }
}
