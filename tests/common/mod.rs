// Shared fixtures; not every test binary uses every helper.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use trackvault::config::AppConfig;
use trackvault::infrastructure::database;
use trackvault::services::file_service::FileService;
use trackvault::services::storage::{ObjectStat, StorageService};
use trackvault::{AppState, create_app};

pub struct MockStorageService {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    pub fn object_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_object(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<GetObjectOutput> {
        let data = self
            .files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Key not found"))?;
        let len = data.len() as i64;
        Ok(GetObjectOutput::builder()
            .body(ByteStream::from(data))
            .content_length(len)
            .build())
    }

    async fn get_object_range(&self, key: &str, start: i64, end: i64) -> Result<GetObjectOutput> {
        let data = self
            .files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Key not found"))?;
        let slice = data[start as usize..=end as usize].to_vec();
        let len = slice.len() as i64;
        Ok(GetObjectOutput::builder()
            .body(ByteStream::from(slice))
            .content_length(len)
            .build())
    }

    async fn stat_object(&self, key: &str) -> Result<ObjectStat> {
        let files = self.files.lock().unwrap();
        let data = files
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Key not found"))?;
        Ok(ObjectStat {
            size: data.len() as i64,
        })
    }

    async fn remove_object(&self, key: &str) -> Result<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let files = self.files.lock().unwrap();
        Ok(files
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

pub async fn setup_app() -> (Router, Arc<MockStorageService>) {
    setup_app_with_config(AppConfig::development()).await
}

pub async fn setup_app_with_config(config: AppConfig) -> (Router, Arc<MockStorageService>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let storage = Arc::new(MockStorageService::new());
    let storage_dyn: Arc<dyn StorageService> = storage.clone();

    let file_service = Arc::new(FileService::new(db.clone(), storage_dyn.clone()));

    let state = AppState {
        db,
        storage: storage_dyn,
        file_service,
        config,
    };

    (create_app(state), storage)
}

pub async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn body_bytes(response: axum::http::Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn register_and_login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(format!(
                    r#"{{"email": "{}", "password": "password123"}}"#,
                    email
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(format!(
                    r#"{{"email": "{}", "password": "password123"}}"#,
                    email
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    body["token"].as_str().unwrap().to_string()
}

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub fn multipart_upload_body(
    filename: &str,
    content_type: &str,
    data: &[u8],
    tags: &[&str],
) -> Vec<u8> {
    let mut body = Vec::new();
    for tag in tags {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"tags\"\r\n\r\n{tag}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn upload_file(
    app: &Router,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
    tags: &[&str],
) -> Value {
    let body = multipart_upload_body(filename, content_type, data, tags);

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

    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}
