//! Protocol encoders: success envelopes and error documents.

use http::{Response, StatusCode};

use crate::{
    body::ResponseBody,
    error::ApiError,
    xml::{XmlElement, to_document},
};

/// Content type of query envelopes.
pub const TEXT_XML: &str = "text/xml";

/// Content type of REST XML documents.
pub const APPLICATION_XML: &str = "application/xml";

/// Header carrying the request id on JSON responses.
pub const AMZN_REQUEST_ID: &str = "x-amzn-requestid";

/// A `200` JSON response.
#[must_use]
pub fn json_response(
    value: &serde_json::Value,
    content_type: &str,
    request_id: &str,
) -> Response<ResponseBody> {
    let json = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, content_type)
        .header(AMZN_REQUEST_ID, request_id)
        .body(ResponseBody::from_bytes(json))
        .expect("valid JSON response")
}

/// A JSON error document:
///
/// ```json
/// { "__type": "ResourceNotFoundException", "message": "..." }
/// ```
#[must_use]
pub fn json_error_response(
    error: &ApiError,
    content_type: &str,
    request_id: &str,
) -> Response<ResponseBody> {
    let json = serde_json::json!({
        "__type": error.code,
        "message": error.message,
    });
    Response::builder()
        .status(error.status)
        .header(http::header::CONTENT_TYPE, content_type)
        .header(AMZN_REQUEST_ID, request_id)
        .body(ResponseBody::from_bytes(json.to_string()))
        .expect("valid JSON error response")
}

/// A query success envelope:
///
/// ```xml
/// <{Action}Response xmlns="...">
///   <{Action}Result>...</{Action}Result>
///   <ResponseMetadata><RequestId>...</RequestId></ResponseMetadata>
/// </{Action}Response>
/// ```
#[must_use]
pub fn query_response(
    action: &str,
    xmlns: &str,
    result: Option<Vec<XmlElement>>,
    request_id: &str,
) -> Response<ResponseBody> {
    let mut children = Vec::with_capacity(2);
    if let Some(result) = result {
        children.push(XmlElement::parent(format!("{action}Result"), result));
    }
    children.push(response_metadata(request_id));
    xml_response(
        StatusCode::OK,
        TEXT_XML,
        &format!("{action}Response"),
        Some(xmlns),
        &children,
    )
}

/// A query error document:
///
/// ```xml
/// <ErrorResponse>
///   <Error><Type>Sender</Type><Code>..</Code><Message>..</Message></Error>
///   <RequestId>..</RequestId>
/// </ErrorResponse>
/// ```
#[must_use]
pub fn query_error_response(error: &ApiError, request_id: &str) -> Response<ResponseBody> {
    let fault = if error.is_client_error() {
        "Sender"
    } else {
        "Receiver"
    };
    let mut fields = vec![
        XmlElement::text("Type", fault),
        XmlElement::text("Code", error.code.to_string()),
        XmlElement::text("Message", error.message.as_str()),
    ];
    fields.extend(XmlElement::optional("Resource", error.resource.as_deref()));
    xml_response(
        error.status,
        TEXT_XML,
        "ErrorResponse",
        None,
        &[
            XmlElement::parent("Error", fields),
            XmlElement::text("RequestId", request_id),
        ],
    )
}

/// A flat REST error document:
///
/// ```xml
/// <Error><Code>NoSuchKey</Code><Message>..</Message><Resource>..</Resource><RequestId>..</RequestId></Error>
/// ```
///
/// HEAD responses carry the status only.
#[must_use]
pub fn rest_error_response(
    error: &ApiError,
    request_id: &str,
    head: bool,
) -> Response<ResponseBody> {
    if head {
        return Response::builder()
            .status(error.status)
            .body(ResponseBody::empty())
            .expect("valid error response");
    }
    let mut fields = vec![
        XmlElement::text("Code", error.code.to_string()),
        XmlElement::text("Message", error.message.as_str()),
    ];
    fields.extend(XmlElement::optional("Resource", error.resource.as_deref()));
    fields.push(XmlElement::text("RequestId", request_id));
    xml_response(error.status, APPLICATION_XML, "Error", None, &fields)
}

/// Any XML document response.
#[must_use]
pub fn xml_response(
    status: StatusCode,
    content_type: &str,
    root: &str,
    xmlns: Option<&str>,
    children: &[XmlElement],
) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, content_type)
        .body(ResponseBody::from_bytes(to_document(root, xmlns, children)))
        .expect("valid XML response")
}

fn response_metadata(request_id: &str) -> XmlElement {
    XmlElement::parent(
        "ResponseMetadata",
        vec![XmlElement::text("RequestId", request_id)],
    )
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_string(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_should_encode_query_envelope() {
        let response = query_response(
            "CreateTopic",
            "urn:sns",
            Some(vec![XmlElement::text("TopicArn", "arn:aws:sns:us-east-1:0:t")]),
            "req-1",
        );
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains(
            "<CreateTopicResponse xmlns=\"urn:sns\"><CreateTopicResult>\
             <TopicArn>arn:aws:sns:us-east-1:0:t</TopicArn></CreateTopicResult>\
             <ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>\
             </CreateTopicResponse>"
        ));
    }

    #[tokio::test]
    async fn test_should_omit_result_when_absent() {
        let body = body_string(query_response("DeleteTopic", "urn:sns", None, "r")).await;
        assert!(!body.contains("DeleteTopicResult"));
        assert!(body.contains("<RequestId>r</RequestId>"));
    }

    #[tokio::test]
    async fn test_should_encode_query_error_with_fault_side() {
        let client = ApiError::bad_request("InvalidParameter", "bad");
        let body = body_string(query_error_response(&client, "r")).await;
        assert!(body.contains("<Error><Type>Sender</Type><Code>InvalidParameter</Code>"));
        assert!(body.contains("</Error><RequestId>r</RequestId></ErrorResponse>"));

        let server = ApiError::internal("boom");
        let response = query_error_response(&server, "r");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("<Type>Receiver</Type>"));
    }

    #[tokio::test]
    async fn test_should_encode_flat_rest_error() {
        let error = ApiError::not_found("NoSuchKey", "missing").with_resource("/b/k");
        let response = rest_error_response(&error, "r", false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            APPLICATION_XML
        );
        let body = body_string(response).await;
        assert!(body.contains(
            "<Error><Code>NoSuchKey</Code><Message>missing</Message>\
             <Resource>/b/k</Resource><RequestId>r</RequestId></Error>"
        ));
    }

    #[tokio::test]
    async fn test_should_send_no_body_for_head_errors() {
        let error = ApiError::not_found("NoSuchKey", "missing");
        let body = body_string(rest_error_response(&error, "r", true)).await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_should_encode_json_error() {
        let error = ApiError::bad_request("ResourceNotFoundException", "gone");
        let response = json_error_response(&error, "application/x-amz-json-1.1", "r");
        assert_eq!(response.headers()[AMZN_REQUEST_ID], "r");
        let value: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(value["__type"], "ResourceNotFoundException");
        assert_eq!(value["message"], "gone");
    }
}
