use crate::api::error::AppError;
use crate::entities::{audio_files, prelude::*};
use crate::services::cover_service::CoverService;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;
use tokio_util::io::ReaderStream;

async fn find_owned_file(
    state: &crate::AppState,
    claims: &Claims,
    file_id: &str,
) -> Result<audio_files::Model, AppError> {
    let file = AudioFiles::find_by_id(file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    super::ensure_owner_or_admin(state, claims, &file).await?;
    Ok(file)
}

#[utoipa::path(
    post,
    path = "/api/files/{id}/image",
    request_body(content = Multipart, description = "Cover image upload: `image`"),
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Cover stored as 250x250 JPEG"),
        (status = 400, description = "Missing or undecodable image"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn upload_image(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let file = find_owned_file(&state, &claims, &file_id).await?;

    let mut image_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            image_bytes = Some(data.to_vec());
        }
    }

    let data = image_bytes.ok_or(AppError::BadRequest("No image provided".to_string()))?;

    let jpeg =
        CoverService::render_cover(&data).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let key = CoverService::cover_key(&file.user_id, &file.id);
    state
        .storage
        .put_object(&key, jpeg, "image/jpeg")
        .await
        .map_err(|e| {
            tracing::error!("Failed to store cover '{}': {}", key, e);
            AppError::Internal("Failed to store cover image".to_string())
        })?;

    let mut active: audio_files::ActiveModel = file.into();
    active.image_key = Set(Some(key));
    active.updated_at = Set(Some(Utc::now()));
    active.update(&state.db).await?;

    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/api/files/{id}/image",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Cover JPEG"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File or cover not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn get_image(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
) -> Result<Response, AppError> {
    let file = find_owned_file(&state, &claims, &file_id).await?;

    let key = file
        .image_key
        .ok_or(AppError::NotFound("No cover image set".to_string()))?;

    let s3_res = state.storage.get_object(&key).await.map_err(|e| {
        tracing::error!("Failed to get cover '{}': {}", key, e);
        AppError::NotFound("Cover image not found".to_string())
    })?;

    let body = Body::from_stream(ReaderStream::new(s3_res.body.into_async_read()));

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/files/{id}/image",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Cover removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_image(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let file = find_owned_file(&state, &claims, &file_id).await?;

    if let Some(key) = &file.image_key
        && let Err(e) = state.storage.remove_object(key).await
    {
        tracing::warn!("Failed to remove cover '{}': {}", key, e);
    }

    let mut active: audio_files::ActiveModel = file.into();
    active.image_key = Set(None);
    active.updated_at = Set(Some(Utc::now()));
    active.update(&state.db).await?;

    Ok(Json(json!({ "success": true })))
}
