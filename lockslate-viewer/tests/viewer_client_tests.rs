use lockslate_types::Role;
use lockslate_viewer::{ViewContent, ViewerClient, ViewerError, ViewerIdentity};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity() -> ViewerIdentity {
    ViewerIdentity {
        user_id: 11,
        role: Role::Student,
        name: "Ada Lovelace".into(),
        email: "ada@example.edu".into(),
    }
}

fn client(origin: &MockServer, pipeline: &MockServer) -> ViewerClient {
    ViewerClient::new(origin.uri(), pipeline.uri(), identity())
}

async fn mount_view(origin: &MockServer, material_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/material/view/{material_id}")))
        .and(header("x-user-id", "11"))
        .and(header("x-user-role", "student"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(origin)
        .await;
}

#[tokio::test]
async fn document_flow_with_explicit_token() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    mount_view(
        &origin,
        7,
        serde_json::json!({
            "type": "document",
            "token": "tok-1",
            "pages": "/document/tok-1/pages",
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/document/tok-1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pages": ["/document/tok-1/page/1.png", "/document/tok-1/page/2.png"],
        })))
        .mount(&pipeline)
        .await;

    let content = client(&origin, &pipeline).open(7).await.unwrap();
    let ViewContent::Document { token, page_urls } = content else {
        panic!("expected document content");
    };
    assert_eq!(token, "tok-1");
    assert_eq!(
        page_urls,
        vec![
            format!("{}/document/tok-1/page/1.png", pipeline.uri()),
            format!("{}/document/tok-1/page/2.png", pipeline.uri()),
        ]
    );
}

#[tokio::test]
async fn document_flow_with_path_embedded_token_only() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    // Older pipeline response shape: no explicit token field
    mount_view(
        &origin,
        7,
        serde_json::json!({
            "type": "document",
            "pages": "/document/legacy-tok/pages",
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/document/legacy-tok/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pages": ["/document/legacy-tok/page/1.png"],
        })))
        .mount(&pipeline)
        .await;

    let content = client(&origin, &pipeline).open(7).await.unwrap();
    let ViewContent::Document { token, .. } = content else {
        panic!("expected document content");
    };
    assert_eq!(token, "legacy-tok");
}

#[tokio::test]
async fn video_flow_builds_playlist_url() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    mount_view(
        &origin,
        8,
        serde_json::json!({
            "type": "video",
            "token": "tok-v",
            "playlist": "/video/tok-v/playlist.m3u8",
        }),
    )
    .await;

    let content = client(&origin, &pipeline).open(8).await.unwrap();
    assert_eq!(
        content,
        ViewContent::Video {
            token: "tok-v".into(),
            playlist_url: format!("{}/video/tok-v/playlist.m3u8", pipeline.uri()),
        }
    );
}

#[tokio::test]
async fn origin_denial_is_a_token_retrieval_error() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/material/view/7"))
        .respond_with(ResponseTemplate::new(403).set_body_json(
            serde_json::json!({ "error": "access denied", "kind": "forbidden" }),
        ))
        .mount(&origin)
        .await;

    let err = client(&origin, &pipeline).open(7).await.unwrap_err();
    assert!(matches!(err, ViewerError::TokenRetrieval(_)));
}

#[tokio::test]
async fn tokenless_descriptor_is_a_token_retrieval_error() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    mount_view(&origin, 7, serde_json::json!({ "type": "document" })).await;

    let err = client(&origin, &pipeline).open(7).await.unwrap_err();
    assert!(matches!(err, ViewerError::TokenRetrieval(_)));
}

#[tokio::test]
async fn failed_page_listing_is_distinct_from_token_errors() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    mount_view(
        &origin,
        7,
        serde_json::json!({
            "type": "document",
            "token": "tok-1",
            "pages": "/document/tok-1/pages",
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/document/tok-1/pages"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&pipeline)
        .await;

    let err = client(&origin, &pipeline).open(7).await.unwrap_err();
    assert!(matches!(err, ViewerError::PageListing(_)));
}

#[tokio::test]
async fn unknown_content_type_is_unsupported() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    mount_view(
        &origin,
        7,
        serde_json::json!({ "type": "hologram", "token": "tok-1" }),
    )
    .await;

    let err = client(&origin, &pipeline).open(7).await.unwrap_err();
    assert!(matches!(err, ViewerError::UnsupportedContent(_)));
}

#[tokio::test]
async fn fetch_page_returns_image_bytes() {
    let origin = MockServer::start().await;
    let pipeline = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/document/tok-1/page/1.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png bytes".to_vec()))
        .mount(&pipeline)
        .await;

    let client = client(&origin, &pipeline);
    let bytes = client
        .fetch_page(&format!("{}/document/tok-1/page/1.png", pipeline.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, b"png bytes");
}
