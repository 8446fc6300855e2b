//! STS for CloudMock.
//!
//! Only `GetCallerIdentity` is served. Signatures are never verified, so the
//! reported identity is a placeholder derived from the access key the caller
//! signed with: every signed caller is an IAM user named after its access key
//! in the default account, and unsigned callers are `anonymous`.

use cloudmock_arn::UserArn;
use cloudmock_core::{AccountId, Identity};
use cloudmock_gateway::{
    ApiError, HandlerFuture, QueryHandler, QueryOutput, QueryParams, RequestContext, XmlElement,
};
use tracing::debug;

/// STS query API version.
pub const API_VERSION: &str = "2011-06-15";

/// Namespace of STS response envelopes.
pub const XML_NAMESPACE: &str = "https://sts.amazonaws.com/doc/2011-06-15/";

/// `UserId` and user name reported for unsigned callers.
pub const ANONYMOUS: &str = "anonymous";

/// Serves `GetCallerIdentity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StsHandler;

impl StsHandler {
    /// A new handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The `GetCallerIdentityResult` fields for `identity`.
    #[must_use]
    pub fn caller_identity(identity: &Identity) -> Vec<XmlElement> {
        let user = identity.access_key_id().unwrap_or(ANONYMOUS);
        vec![
            XmlElement::text("UserId", user),
            XmlElement::text("Account", AccountId::DEFAULT),
            XmlElement::text("Arn", UserArn::new(user).to_string()),
        ]
    }
}

impl QueryHandler for StsHandler {
    fn service_name(&self) -> &'static str {
        "sts"
    }

    fn api_version(&self) -> &'static str {
        API_VERSION
    }

    fn xml_namespace(&self) -> &'static str {
        XML_NAMESPACE
    }

    fn supports(&self, action: &str) -> bool {
        action == "GetCallerIdentity"
    }

    fn handle(
        &self,
        ctx: RequestContext,
        action: String,
        _params: QueryParams,
    ) -> HandlerFuture<QueryOutput> {
        Box::pin(async move {
            if action != "GetCallerIdentity" {
                return Err(ApiError::invalid_action(&action));
            }
            debug!(signed = ctx.identity.is_signed(), "reporting caller identity");
            Ok(QueryOutput::result(Self::caller_identity(&ctx.identity)))
        })
    }
}

#[cfg(test)]
mod tests {
    use cloudmock_core::{Namespace, SignatureScheme};

    use super::*;

    #[tokio::test]
    async fn test_should_report_signed_caller() {
        let ctx = RequestContext::new(Namespace::undefined(), "r").with_identity(Identity::Signed {
            access_key_id: "AKIDEXAMPLE".into(),
            scheme: SignatureScheme::SigV4,
        });
        let output = StsHandler
            .handle(ctx, "GetCallerIdentity".into(), QueryParams::default())
            .await
            .unwrap();
        assert_eq!(
            output.result.unwrap(),
            vec![
                XmlElement::text("UserId", "AKIDEXAMPLE"),
                XmlElement::text("Account", "000000000000"),
                XmlElement::text("Arn", "arn:aws:iam::000000000000:user/AKIDEXAMPLE"),
            ]
        );
    }

    #[tokio::test]
    async fn test_should_report_anonymous_caller() {
        let ctx = RequestContext::new(Namespace::undefined(), "r");
        let output = StsHandler
            .handle(ctx, "GetCallerIdentity".into(), QueryParams::default())
            .await
            .unwrap();
        let result = output.result.unwrap();
        assert_eq!(result[0], XmlElement::text("UserId", ANONYMOUS));
        assert_eq!(
            result[2],
            XmlElement::text("Arn", "arn:aws:iam::000000000000:user/anonymous")
        );
    }

    #[test]
    fn test_should_claim_only_get_caller_identity() {
        assert!(StsHandler.supports("GetCallerIdentity"));
        assert!(!StsHandler.supports("AssumeRole"));
    }
}
