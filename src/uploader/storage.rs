//! Direct form POST to the presigned object-storage endpoint

use crate::uploader::error::{UploadError, UploadResult};
use crate::uploader::multipart;
use bytes::Bytes;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use std::collections::HashMap;
use tracing::{debug, warn};

/// POST a prebuilt multipart body and return the `Location` of the stored
/// object.
///
/// Only 201 and 204 count as success. A success without `Location` yields
/// an empty string; the permanent link does not depend on it.
pub async fn post_form(
    http_client: &HttpClient,
    url: &str,
    headers: &HashMap<String, String>,
    boundary: &str,
    body: Bytes,
) -> UploadResult<String> {
    debug!(
        target: "uploader::storage",
        url = %url,
        size = body.len(),
        "Posting form to storage"
    );

    let mut request = http_client
        .post(url)
        .header(CONTENT_TYPE, multipart::content_type(boundary))
        .body(body);

    // The boundary-carrying content type always wins
    for (name, value) in headers {
        if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
            continue;
        }
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request.send().await?;
    let status = response.status();

    if status != StatusCode::CREATED && status != StatusCode::NO_CONTENT {
        let body = response.text().await.unwrap_or_default();
        return Err(UploadError::UploadFailed {
            status: status.as_u16(),
            body: format_storage_error(&body),
        });
    }

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match location {
        Some(location) => Ok(location),
        None => {
            warn!(
                target: "uploader::storage",
                status = status.as_u16(),
                "Storage response has no Location header"
            );
            Ok(String::new())
        }
    }
}

/// Condense an S3-style XML error body to `Code: Message`
fn format_storage_error(body: &str) -> String {
    if let Some(code) = extract_xml_element(body, "Code") {
        if let Some(message) = extract_xml_element(body, "Message") {
            return format!("{}: {}", code, message);
        }
        return code;
    }

    body.trim().to_string()
}

/// Simple XML element extraction (for error parsing)
fn extract_xml_element(xml: &str, tag: &str) -> Option<String> {
    let open_tag = format!("<{}>", tag);
    let close_tag = format!("</{}>", tag);

    let start = xml.find(&open_tag)? + open_tag.len();
    let end = xml[start..].find(&close_tag)?;

    Some(xml[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const S3_DENIED: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>AccessDenied</Code><Message>Invalid according to Policy: Policy expired.</Message></Error>";

    #[test]
    fn test_format_storage_error() {
        assert_eq!(
            format_storage_error(S3_DENIED),
            "AccessDenied: Invalid according to Policy: Policy expired."
        );
        assert_eq!(format_storage_error("  plain text\n"), "plain text");
    }

    #[tokio::test]
    async fn test_post_form_captures_location() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bucket")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=B$".to_string()),
            )
            .match_header("x-extra", "1")
            .match_body("BODY")
            .with_status(204)
            .with_header("location", "https://s3/y")
            .create_async()
            .await;

        let headers = HashMap::from([("x-extra".to_string(), "1".to_string())]);
        let url = format!("{}/bucket", server.url());
        let location = post_form(
            &HttpClient::new(),
            &url,
            &headers,
            "B",
            Bytes::from_static(b"BODY"),
        )
        .await
        .unwrap();

        assert_eq!(location, "https://s3/y");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_policy_content_type_is_not_duplicated() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bucket")
            .match_header("content-type", "multipart/form-data; boundary=B")
            .with_status(201)
            .with_header("location", "https://s3/y")
            .create_async()
            .await;

        let headers = HashMap::from([("Content-Type".to_string(), "text/plain".to_string())]);
        let url = format!("{}/bucket", server.url());
        post_form(&HttpClient::new(), &url, &headers, "B", Bytes::new())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_form_without_location() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bucket")
            .with_status(201)
            .create_async()
            .await;

        let url = format!("{}/bucket", server.url());
        let location = post_form(&HttpClient::new(), &url, &HashMap::new(), "B", Bytes::new())
            .await
            .unwrap();
        assert_eq!(location, "");
    }

    #[tokio::test]
    async fn test_post_form_rejects_ok() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bucket")
            .with_status(200)
            .create_async()
            .await;

        let url = format!("{}/bucket", server.url());
        let err = post_form(&HttpClient::new(), &url, &HashMap::new(), "B", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UploadFailed { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_post_form_reports_s3_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bucket")
            .with_status(403)
            .with_body(S3_DENIED)
            .create_async()
            .await;

        let url = format!("{}/bucket", server.url());
        match post_form(&HttpClient::new(), &url, &HashMap::new(), "B", Bytes::new()).await {
            Err(UploadError::UploadFailed { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.starts_with("AccessDenied"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
