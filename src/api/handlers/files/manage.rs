use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::tag_service::TagService;
use crate::utils::auth::Claims;
use crate::utils::validation::sanitize_filename;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

use super::types::{FileInfoResponse, FileResponse, RenameRequest, VersionResponse};

#[utoipa::path(
    delete,
    path = "/api/files/{id}/delete",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File, versions, and storage objects removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let file = AudioFiles::find_by_id(&file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    super::ensure_owner_or_admin(&state, &claims, &file).await?;

    state.file_service.delete_file(file).await?;

    tracing::info!("Deleted file {} for {}", file_id, claims.sub);

    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    put,
    path = "/api/files/{id}/rename",
    request_body = RenameRequest,
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File renamed", body = FileResponse),
        (status = 400, description = "Invalid or conflicting filename"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn rename_file(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<FileResponse>, AppError> {
    let file = AudioFiles::find_by_id(&file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    super::ensure_owner_or_admin(&state, &claims, &file).await?;

    let new_name =
        sanitize_filename(&req.file_name).map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Another file of this owner may already claim the target name
    let taken = AudioFiles::find()
        .filter(audio_files::Column::UserId.eq(&file.user_id))
        .filter(audio_files::Column::FileName.eq(&new_name))
        .filter(audio_files::Column::Id.ne(&file.id))
        .one(&state.db)
        .await?
        .is_some();

    if taken {
        return Err(AppError::BadRequest(
            "A file with that name already exists".to_string(),
        ));
    }

    // Metadata-only rename: stored objects keep their historical keys
    let mut active: audio_files::ActiveModel = file.into();
    active.file_name = Set(new_name);
    active.updated_at = Set(Some(Utc::now()));
    let updated = active.update(&state.db).await?;

    let tags = TagService::tags_for_file(&state.db, &updated.id).await?;
    Ok(Json(FileResponse::from_model(updated, tags)))
}

#[utoipa::path(
    get,
    path = "/api/files/{id}/info",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata with version history", body = FileInfoResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn file_info(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
) -> Result<Json<FileInfoResponse>, AppError> {
    let file = AudioFiles::find_by_id(&file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    super::ensure_owner_or_admin(&state, &claims, &file).await?;

    let tags = TagService::tags_for_file(&state.db, &file.id).await?;
    let versions = state
        .file_service
        .versions(&file.id)
        .await?
        .into_iter()
        .map(VersionResponse::from)
        .collect();

    Ok(Json(FileInfoResponse {
        file: FileResponse::from_model(file, tags),
        versions,
    }))
}
