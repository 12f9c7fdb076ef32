mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;
use tower::ServiceExt;
use trackvault::config::AppConfig;

fn sample_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

fn range_request(uri: &str, token: &str, range: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header(header::RANGE, range)
        .body(Body::empty())
        .unwrap()
}

async fn upload_track(app: &axum::Router, token: &str, data: &[u8]) -> String {
    let body = upload_file(app, token, "track.mp3", "audio/mpeg", data, &[]).await;
    body["file"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_download_without_range() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;
    let data = sample_payload(1000);
    let file_id = upload_track(&app, &token, &data).await;

    let response = app
        .clone()
        .oneshot(get_with_token(&format!("/api/files/{}", file_id), &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCEPT_RANGES).unwrap(),
        "bytes"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "1000"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline"));

    assert_eq!(body_bytes(response).await, data);
}

#[tokio::test]
async fn test_open_range_covers_whole_object() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;
    let data = sample_payload(1000);
    let file_id = upload_track(&app, &token, &data).await;

    let response = app
        .clone()
        .oneshot(range_request(
            &format!("/api/files/{}", file_id),
            &token,
            "bytes=0-",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 0-999/1000"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "1000"
    );
    assert_eq!(body_bytes(response).await, data);
}

#[tokio::test]
async fn test_closed_range_returns_slice() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;
    let data = sample_payload(1000);
    let file_id = upload_track(&app, &token, &data).await;

    let response = app
        .clone()
        .oneshot(range_request(
            &format!("/api/files/{}", file_id),
            &token,
            "bytes=100-199",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 100-199/1000"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        "100"
    );
    assert_eq!(body_bytes(response).await, data[100..200].to_vec());
}

#[tokio::test]
async fn test_range_end_clamped_and_suffix_of_object() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;
    let data = sample_payload(50);
    let file_id = upload_track(&app, &token, &data).await;

    // End past the object is clamped
    let response = app
        .clone()
        .oneshot(range_request(
            &format!("/api/files/{}", file_id),
            &token,
            "bytes=40-9999",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 40-49/50"
    );
    assert_eq!(body_bytes(response).await, data[40..].to_vec());

    // Omitted end runs to the last byte
    let response = app
        .clone()
        .oneshot(range_request(
            &format!("/api/files/{}", file_id),
            &token,
            "bytes=45-",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 45-49/50"
    );
}

#[tokio::test]
async fn test_unsatisfiable_ranges() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;
    let data = sample_payload(50);
    let file_id = upload_track(&app, &token, &data).await;
    let uri = format!("/api/files/{}", file_id);

    for bad in ["bytes=50-", "bytes=99-120", "bytes=abc-", "bytes=-10"] {
        let response = app
            .clone()
            .oneshot(range_request(&uri, &token, bad))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::RANGE_NOT_SATISFIABLE,
            "expected 416 for {}",
            bad
        );
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */50"
        );
    }
}

#[tokio::test]
async fn test_version_pinning() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;

    let v1_data = b"first version bytes".to_vec();
    let v2_data = b"second version, different".to_vec();
    let file_id = upload_track(&app, &token, &v1_data).await;
    upload_track(&app, &token, &v2_data).await;

    // Default serves the current version
    let response = app
        .clone()
        .oneshot(get_with_token(&format!("/api/files/{}", file_id), &token))
        .await
        .unwrap();
    assert_eq!(body_bytes(response).await, v2_data);

    // Pinned fetch of the superseded version
    let response = app
        .clone()
        .oneshot(get_with_token(
            &format!("/api/files/{}?version=1", file_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, v1_data);

    // Unknown version
    let response = app
        .clone()
        .oneshot(get_with_token(
            &format!("/api/files/{}?version=9", file_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_access_control_on_stream() {
    let (app, _storage) = setup_app().await;
    let token_a = register_and_login(&app, "alice@example.com").await;
    let token_b = register_and_login(&app, "bob@example.com").await;
    let file_id = upload_track(&app, &token_a, b"private bytes").await;
    let uri = format!("/api/files/{}", file_id);

    // Authenticated non-owner is forbidden
    let response = app
        .clone()
        .oneshot(get_with_token(&uri, &token_b))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unauthenticated is unauthorized
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown file is a 404 for its owner
    let response = app
        .clone()
        .oneshot(get_with_token("/api/files/no-such-id", &token_a))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_blobs_and_metadata() {
    let (app, storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;

    let file_id = upload_track(&app, &token, b"v1").await;
    upload_track(&app, &token, b"v2 bytes").await;
    assert_eq!(storage.object_count(), 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/files/{}/delete", file_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    // Every version's object is gone
    assert_eq!(storage.object_count(), 0);

    let response = app
        .clone()
        .oneshot(get_with_token(&format!("/api/files/{}", file_id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_with_token("/api/files", &token))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_size_limit() {
    let config = AppConfig {
        max_file_size: 16,
        ..AppConfig::development()
    };
    let (app, _storage) = setup_app_with_config(config).await;
    let token = register_and_login(&app, "alice@example.com").await;

    let body = multipart_upload_body("big.mp3", "audio/mpeg", &[0u8; 17], &[]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header("Authorization", format!("Bearer {}", token))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
