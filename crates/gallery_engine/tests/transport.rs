use std::time::Duration;

use bytes::Bytes;
use gallery_core::describe;
use gallery_engine::{
    ChunkUpload, FailureKind, ReqwestTransport, Transport, TransportSettings,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> ReqwestTransport {
    gallery_logging::initialize_for_tests();
    ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        ..TransportSettings::default()
    })
    .expect("transport")
}

#[tokio::test]
async fn get_sends_accept_header_and_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images/all"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"image_data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let descriptor = describe("image_data", None).unwrap();
    let body = transport.request(&descriptor).await.expect("request ok");
    assert_eq!(body, json!({"image_data": []}));
}

#[tokio::test]
async fn post_sends_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/settings/password"))
        .and(header("Content-Type", "application/json; charset=UTF-8"))
        .and(body_json(json!({"min_length": 12})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"password_settings": {"min_length": 12}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let descriptor = describe("settings_set_password", Some(json!({"min_length": 12}))).unwrap();
    let body = transport.request(&descriptor).await.unwrap();
    assert_eq!(body["password_settings"]["min_length"], json!(12));
}

#[tokio::test]
async fn delete_uses_delete_method() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/settings/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let descriptor = describe("settings_delete_user", Some(json!({"id": 4}))).unwrap();
    transport.request(&descriptor).await.unwrap();
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance/logs"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let descriptor = describe("maintenance_get_logs", None).unwrap();
    let err = transport.request(&descriptor).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
}

#[tokio::test]
async fn malformed_json_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance/info"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let descriptor = describe("maintenance_get_info", None).unwrap();
    let err = transport.request(&descriptor).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out_when_limit_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/settings/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..TransportSettings::default()
    })
    .unwrap();
    let descriptor = describe("settings_get_image", None).unwrap();
    let err = transport.request(&descriptor).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"image_data": "0123456789"})))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        max_response_bytes: 10,
        ..TransportSettings::default()
    })
    .unwrap();
    let descriptor = describe("image_data", None).unwrap();
    let err = transport.request(&descriptor).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 10, .. }));
}

#[tokio::test]
async fn chunk_upload_is_multipart_with_info_and_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/images/upload"))
        .and(body_string_contains("name=\"info\""))
        .and(body_string_contains("{\"current\":{\"index\":0,\"chunk\":1}}"))
        .and(body_string_contains("filename=\"cat.jpg\""))
        .and(body_string_contains("meow-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "progress": [{"progress": 50.0}],
            "current_file": "cat.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let chunk = ChunkUpload {
        info: "{\"current\":{\"index\":0,\"chunk\":1}}".to_string(),
        file_name: "cat.jpg".to_string(),
        bytes: Bytes::from_static(b"meow-bytes"),
    };
    let body = transport.upload_chunk(chunk).await.unwrap();
    assert_eq!(body["current_file"], json!("cat.jpg"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestTransport::new(TransportSettings {
        base_url: "not a url".to_string(),
        ..TransportSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
