use crate::api::error::AppError;
use crate::entities::packs;
use crate::services::pack_service::PackService;
use crate::services::tag_service::TagService;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use super::files::FileResponse;

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreatePackRequest {
    #[validate(length(min = 1, max = 120, message = "Pack name must be between 1 and 120 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default, alias = "fileIds")]
    pub file_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePackRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// When present, the member set is replaced wholesale with this list.
    #[serde(alias = "fileIds")]
    pub file_ids: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub share_token: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<packs::Model> for PackResponse {
    fn from(pack: packs::Model) -> Self {
        Self {
            id: pack.id,
            name: pack.name,
            description: pack.description,
            share_token: pack.share_token,
            created_at: pack.created_at.unwrap_or_else(Utc::now),
            updated_at: pack.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PackDetailResponse {
    #[serde(flatten)]
    pub pack: PackResponse,
    pub files: Vec<FileResponse>,
}

pub(crate) async fn pack_files_response(
    db: &DatabaseConnection,
    pack_id: &str,
) -> Result<Vec<FileResponse>, AppError> {
    let mut files = Vec::new();
    for file in PackService::files_in_pack(db, pack_id).await? {
        let tags = TagService::tags_for_file(db, &file.id).await?;
        files.push(FileResponse::from_model(file, tags));
    }
    Ok(files)
}

#[utoipa::path(
    post,
    path = "/api/packs",
    request_body = CreatePackRequest,
    responses(
        (status = 201, description = "Pack created with a fresh share token", body = PackResponse),
        (status = 400, description = "Bad name or foreign file ids"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn create_pack(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePackRequest>,
) -> Result<(StatusCode, Json<PackResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let pack = PackService::create_pack(
        &state.db,
        &claims.sub,
        req.name,
        req.description,
        &req.file_ids,
    )
    .await?;

    tracing::info!("Created pack {} for {}", pack.id, claims.sub);

    Ok((StatusCode::CREATED, Json(pack.into())))
}

#[utoipa::path(
    get,
    path = "/api/packs",
    responses(
        (status = 200, description = "The caller's packs", body = Vec<PackResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn list_packs(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PackResponse>>, AppError> {
    let packs = PackService::list_user_packs(&state.db, &claims.sub).await?;
    Ok(Json(packs.into_iter().map(PackResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/packs/{id}",
    params(
        ("id" = String, Path, description = "Pack ID")
    ),
    responses(
        (status = 200, description = "Pack with member files", body = PackDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Pack not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn get_pack(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(pack_id): Path<String>,
) -> Result<Json<PackDetailResponse>, AppError> {
    let pack = PackService::get_owned_pack(&state.db, &pack_id, &claims.sub).await?;
    let files = pack_files_response(&state.db, &pack.id).await?;

    Ok(Json(PackDetailResponse {
        pack: pack.into(),
        files,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/packs/{id}",
    request_body = UpdatePackRequest,
    params(
        ("id" = String, Path, description = "Pack ID")
    ),
    responses(
        (status = 200, description = "Pack updated; a provided file list replaces the member set", body = PackDetailResponse),
        (status = 400, description = "Foreign file ids"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Pack not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn update_pack(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(pack_id): Path<String>,
    Json(req): Json<UpdatePackRequest>,
) -> Result<Json<PackDetailResponse>, AppError> {
    let pack = PackService::update_pack(
        &state.db,
        &pack_id,
        &claims.sub,
        req.name,
        req.description,
        req.file_ids.as_deref(),
    )
    .await?;

    let files = pack_files_response(&state.db, &pack.id).await?;

    Ok(Json(PackDetailResponse {
        pack: pack.into(),
        files,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/packs/{id}",
    params(
        ("id" = String, Path, description = "Pack ID")
    ),
    responses(
        (status = 200, description = "Pack and its membership rows removed; files untouched"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Pack not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_pack(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(pack_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    PackService::delete_pack(&state.db, &pack_id, &claims.sub).await?;
    Ok(Json(json!({ "success": true })))
}
