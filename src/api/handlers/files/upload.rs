use crate::api::error::AppError;
use crate::services::file_service::NewUpload;
use crate::utils::auth::Claims;
use crate::utils::validation::{
    resolve_mime, sanitize_filename, validate_audio_mime, validate_file_size,
};
use axum::{Extension, Json, extract::Multipart, extract::State};
use std::time::Instant;

use super::types::{UploadResponse, UploadedFile};

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    let err_msg = e.to_string();
    if err_msg.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err_msg)
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Multipart, description = "Audio upload: `file`, repeated `tags`, optional `custom_file_name`"),
    responses(
        (status = 200, description = "File stored as a new file or new version", body = UploadResponse),
        (status = 400, description = "Missing file, oversize payload, or disallowed MIME type"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let started = Instant::now();

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut declared_mime: Option<String> = None;
    let mut original_name = String::new();
    let mut custom_name: Option<String> = None;
    let mut tag_names: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                original_name = field.file_name().unwrap_or("unnamed").to_string();
                declared_mime = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                file_bytes = Some(data.to_vec());
            }
            "tags" => {
                let text = field.text().await.unwrap_or_default();
                if !text.trim().is_empty() {
                    tag_names.push(text);
                }
            }
            "custom_file_name" | "customFileName" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    custom_name = Some(text);
                }
            }
            _ => {}
        }
    }

    let data = file_bytes.ok_or(AppError::BadRequest("No file provided".to_string()))?;

    validate_file_size(data.len(), state.config.max_file_size)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let file_name = sanitize_filename(custom_name.as_deref().unwrap_or(&original_name))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mime_type = resolve_mime(declared_mime.as_deref(), &data, &file_name);
    validate_audio_mime(&mime_type, &state.config.allowed_audio_mimes)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let stored = state
        .file_service
        .process_upload(
            &claims.sub,
            NewUpload {
                file_name,
                mime_type,
                data,
                tags: tag_names,
            },
        )
        .await?;

    tracing::info!(
        "Stored '{}' v{} for {} in {:?}{}",
        stored.file.file_name,
        stored.version,
        claims.sub,
        started.elapsed(),
        if stored.duplicate { " (duplicate)" } else { "" }
    );

    Ok(Json(UploadResponse {
        success: true,
        file: UploadedFile {
            id: stored.file.id,
            name: stored.file.file_name,
            mime_type: stored.file.mime_type,
            size: stored.file.size,
            version: stored.version,
            duplicate: stored.duplicate,
            processing_time_ms: started.elapsed().as_millis() as u64,
        },
    }))
}
