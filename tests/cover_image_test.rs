mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;
use tower::ServiceExt;

fn sample_png() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        64,
        48,
        image::Rgb([10, 200, 120]),
    ));
    let mut buf = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buf),
        image::ImageOutputFormat::Png,
    )
    .unwrap();
    buf
}

fn multipart_image_body(data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_image(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_cover_image_lifecycle() {
    let (app, storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;

    let upload = upload_file(&app, &token, "track.mp3", "audio/mpeg", b"audio", &[]).await;
    let file_id = upload["file"]["id"].as_str().unwrap().to_string();
    let image_uri = format!("/api/files/{}/image", file_id);

    // No cover yet
    let response = app
        .clone()
        .oneshot(get_with_token(&image_uri, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Attach
    let response = app
        .clone()
        .oneshot(post_image(&image_uri, &token, multipart_image_body(&sample_png())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(storage.object_count(), 2); // audio object + cover

    // Fetch: a fixed-size JPEG regardless of the input dimensions
    let response = app
        .clone()
        .oneshot(get_with_token(&image_uri, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    let jpeg = body_bytes(response).await;
    assert_eq!(
        image::guess_format(&jpeg).unwrap(),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!(decoded.width(), 250);
    assert_eq!(decoded.height(), 250);

    // File listing reflects the cover
    let response = app
        .clone()
        .oneshot(get_with_token("/api/files", &token))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["files"][0]["has_image"], true);

    // Remove
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&image_uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(storage.object_count(), 1);

    let response = app
        .clone()
        .oneshot(get_with_token(&image_uri, &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cover_image_rejects_garbage() {
    let (app, _storage) = setup_app().await;
    let token = register_and_login(&app, "alice@example.com").await;

    let upload = upload_file(&app, &token, "track.mp3", "audio/mpeg", b"audio", &[]).await;
    let file_id = upload["file"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_image(
            &format!("/api/files/{}/image", file_id),
            &token,
            multipart_image_body(b"this is not an image"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cover_image_requires_ownership() {
    let (app, _storage) = setup_app().await;
    let token_a = register_and_login(&app, "alice@example.com").await;
    let token_b = register_and_login(&app, "bob@example.com").await;

    let upload = upload_file(&app, &token_a, "track.mp3", "audio/mpeg", b"audio", &[]).await;
    let file_id = upload["file"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_image(
            &format!("/api/files/{}/image", file_id),
            &token_b,
            multipart_image_body(&sample_png()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
