//! Transport classification tests against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use tiny_openai::prelude::*;
use tiny_openai::transport::{RequestBody, Transport};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Transport {
    Transport::new(&ClientConfig::new("test-api-key").with_debug(true)).unwrap()
}

async fn server_with_status(status: u16) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": {"message": "nope", "type": "invalid_request_error"}
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_non_200_statuses_collapse_to_empty() {
    let cases = [
        (400, LlmErrorKind::BadRequest),
        (401, LlmErrorKind::Auth),
        (404, LlmErrorKind::NotFound),
        (429, LlmErrorKind::HttpStatus),
        (500, LlmErrorKind::HttpStatus),
        (201, LlmErrorKind::HttpStatus),
    ];

    for (status, kind) in cases {
        let mock_server = server_with_status(status).await;
        let url = format!("{}/v1/chat/completions", mock_server.uri());

        let outcome = transport()
            .post(&url, RequestBody::Json(json!({"model": "m", "stream": false})))
            .await;

        assert!(!outcome.streaming);
        assert_eq!(outcome.error_kind(), Some(kind), "status {status}");
        assert_eq!(outcome.result.as_ref().unwrap_err().status, Some(status));
        assert!(outcome.into_payload().is_empty());
    }
}

#[tokio::test]
async fn test_streaming_flag_reported_on_failure() {
    let mock_server = server_with_status(401).await;
    let url = format!("{}/v1/chat/completions", mock_server.uri());

    let outcome = transport()
        .post(&url, RequestBody::Json(json!({"model": "m", "stream": true})))
        .await;

    assert!(outcome.streaming);
    assert_eq!(outcome.error_kind(), Some(LlmErrorKind::Auth));
}

#[tokio::test]
async fn test_network_failure_collapses_to_empty() {
    let outcome = transport()
        .post(
            "http://127.0.0.1:1/v1/embeddings",
            RequestBody::Json(json!({"model": "m", "input": "a"})),
        )
        .await;

    assert_eq!(outcome.error_kind(), Some(LlmErrorKind::Network));
    assert!(outcome.into_payload().is_empty());
}

#[tokio::test]
async fn test_refused_connection_with_tls_in_url_is_network() {
    let outcome = transport()
        .post(
            "http://127.0.0.1:1/v1/tls-gateway/ssl/embeddings",
            RequestBody::Json(json!({"model": "m", "input": "a"})),
        )
        .await;

    assert_eq!(outcome.error_kind(), Some(LlmErrorKind::Network));
}

#[tokio::test]
async fn test_undecodable_body_collapses_to_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&mock_server)
        .await;

    let outcome = transport()
        .post(&mock_server.uri(), RequestBody::Json(json!({"model": "m"})))
        .await;

    assert_eq!(outcome.error_kind(), Some(LlmErrorKind::ResponseFormat));
    assert!(outcome.into_payload().is_empty());
}

#[tokio::test]
async fn test_sends_bearer_and_json_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1/embeddings", mock_server.uri());
    let outcome = transport()
        .post(&url, RequestBody::Json(json!({"model": "m", "input": "a"})))
        .await;

    let payload = outcome.result.unwrap();
    assert_eq!(payload.into_json(), Some(json!({"ok": true})));
}
