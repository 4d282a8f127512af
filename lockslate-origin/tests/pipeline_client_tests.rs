use lockslate_origin::OriginError;
use lockslate_origin::pipeline_client::PipelineClient;
use lockslate_types::SessionDescriptor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> PipelineClient {
    PipelineClient::new(server.uri(), "internal-key", 5).unwrap()
}

#[tokio::test]
async fn encrypt_returns_storage_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "stored_as": "abc123.slate" })),
        )
        .mount(&server)
        .await;

    let stored_as = client(&server)
        .encrypt("lecture.pdf", b"bytes".to_vec(), "aa".repeat(32).as_str())
        .await
        .unwrap();
    assert_eq!(stored_as, "abc123.slate");
}

#[tokio::test]
async fn encrypt_missing_stored_as_is_contract_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
        )
        .mount(&server)
        .await;

    let result = client(&server)
        .encrypt("lecture.pdf", b"bytes".to_vec(), "secret")
        .await;
    assert!(matches!(result.unwrap_err(), OriginError::Contract(_)));
}

#[tokio::test]
async fn encrypt_5xx_is_pipeline_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server)
        .encrypt("lecture.pdf", b"bytes".to_vec(), "secret")
        .await;
    assert!(matches!(
        result.unwrap_err(),
        OriginError::PipelineUnavailable(_)
    ));
}

#[tokio::test]
async fn unreachable_pipeline_is_pipeline_unavailable() {
    // Nothing listens here
    let client = PipelineClient::new("http://127.0.0.1:1", "internal-key", 2).unwrap();
    let result = client.encrypt("lecture.pdf", b"bytes".to_vec(), "secret").await;
    assert!(matches!(
        result.unwrap_err(),
        OriginError::PipelineUnavailable(_)
    ));
}

#[tokio::test]
async fn slow_pipeline_times_out_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/encrypt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "stored_as": "x.slate" }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = PipelineClient::new(server.uri(), "internal-key", 1).unwrap();
    let result = client.encrypt("lecture.pdf", b"bytes".to_vec(), "secret").await;
    assert!(matches!(
        result.unwrap_err(),
        OriginError::PipelineUnavailable(_)
    ));
}

#[tokio::test]
async fn decrypt_parses_document_descriptor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decrypt/abc123.slate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "document",
            "token": "tok-1",
            "pages": "/document/tok-1/pages",
        })))
        .mount(&server)
        .await;

    let descriptor = client(&server)
        .decrypt("abc123.slate", "lecture.pdf", "secret")
        .await
        .unwrap();
    assert_eq!(
        descriptor,
        SessionDescriptor::Document {
            token: "tok-1".into(),
            pages: "/document/tok-1/pages".into(),
        }
    );
}

#[tokio::test]
async fn decrypt_unusable_descriptor_is_contract_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decrypt/abc123.slate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "type": "mystery" })),
        )
        .mount(&server)
        .await;

    let result = client(&server)
        .decrypt("abc123.slate", "lecture.pdf", "secret")
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, OriginError::Contract(_)));
    assert!(err.to_string().contains("failed to retrieve access token"));
}

#[tokio::test]
async fn decrypt_422_is_render_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decrypt/abc123.slate"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let result = client(&server)
        .decrypt("abc123.slate", "lecture.pdf", "secret")
        .await;
    assert!(matches!(result.unwrap_err(), OriginError::Render(_)));
}

#[tokio::test]
async fn decrypt_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decrypt/gone.slate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client(&server)
        .decrypt("gone.slate", "lecture.pdf", "secret")
        .await;
    assert!(matches!(result.unwrap_err(), OriginError::NotFound(_)));
}
