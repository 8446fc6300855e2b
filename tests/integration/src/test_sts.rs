//! STS integration tests.

#[cfg(test)]
mod tests {
    use crate::sts_client;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_get_caller_identity() {
        let client = sts_client();
        let identity = client
            .get_caller_identity()
            .send()
            .await
            .expect("get_caller_identity");

        assert_eq!(identity.account(), Some("000000000000"));
        assert_eq!(identity.user_id(), Some("AKIDEXAMPLE"));
        assert_eq!(
            identity.arn(),
            Some("arn:aws:iam::000000000000:user/AKIDEXAMPLE")
        );
    }
}
