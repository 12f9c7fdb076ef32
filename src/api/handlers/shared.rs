//! Public, unauthenticated access: pack reads via share token, plus the
//! random-file discovery endpoint.

use crate::api::error::AppError;
use crate::entities::prelude::*;
use crate::services::pack_service::PackService;
use crate::services::tag_service::TagService;
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;

use super::files::FileResponse;
use super::files::stream::serve_object;
use super::packs::pack_files_response;

#[derive(Serialize, ToSchema)]
pub struct SharedPackResponse {
    pub name: String,
    pub description: Option<String>,
    pub files: Vec<FileResponse>,
}

#[utoipa::path(
    get,
    path = "/api/shared/{share_link}",
    params(
        ("share_link" = String, Path, description = "Pack share token")
    ),
    responses(
        (status = 200, description = "Pack contents", body = SharedPackResponse),
        (status = 404, description = "Unknown share token")
    )
)]
pub async fn get_shared_pack(
    State(state): State<crate::AppState>,
    Path(share_link): Path<String>,
) -> Result<Json<SharedPackResponse>, AppError> {
    let pack = PackService::get_by_token(&state.db, &share_link).await?;
    let files = pack_files_response(&state.db, &pack.id).await?;

    Ok(Json(SharedPackResponse {
        name: pack.name,
        description: pack.description,
        files,
    }))
}

#[utoipa::path(
    get,
    path = "/api/shared/{share_link}/files/{id}",
    params(
        ("share_link" = String, Path, description = "Pack share token"),
        ("id" = String, Path, description = "File ID, must be a pack member")
    ),
    responses(
        (status = 200, description = "Full audio stream"),
        (status = 206, description = "Partial content for a Range request"),
        (status = 404, description = "Unknown token or file not in pack"),
        (status = 416, description = "Range not satisfiable")
    )
)]
pub async fn stream_shared_file(
    State(state): State<crate::AppState>,
    Path((share_link, file_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let pack = PackService::get_by_token(&state.db, &share_link).await?;

    if !PackService::pack_contains_file(&state.db, &pack.id, &file_id).await? {
        return Err(AppError::NotFound(
            "File not found in this pack".to_string(),
        ));
    }

    let file = AudioFiles::find_by_id(&file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    // Share-token access always serves the current version
    let key = file.storage_key.clone();
    serve_object(&state, &file, &key, &headers).await
}

#[derive(Serialize, ToSchema)]
pub struct RandomFileResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    pub fetched_at: chrono::DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/shared/random",
    responses(
        (status = 200, description = "One random file record across all users", body = RandomFileResponse),
        (status = 404, description = "No files exist yet")
    )
)]
pub async fn random_file(
    State(state): State<crate::AppState>,
) -> Result<Json<RandomFileResponse>, AppError> {
    let file = AudioFiles::find()
        .order_by_desc(Expr::cust("RANDOM()"))
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("No files available".to_string()))?;

    let tags = TagService::tags_for_file(&state.db, &file.id).await?;

    Ok(Json(RandomFileResponse {
        file: FileResponse::from_model(file, tags),
        fetched_at: Utc::now(),
    }))
}
