use crate::api::error::AppError;
use crate::services::tag_service::{TagService, TagSort, TagWithCount};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use super::files::list::query_files;
use super::files::{FileListResponse, ListFilesQuery};

#[derive(Default, Deserialize)]
pub struct ListTagsQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub sort: TagSort,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(
        ("search" = Option<String>, Query, description = "Tag name substring, case-insensitive"),
        ("sort" = Option<String>, Query, description = "count | name")
    ),
    responses(
        (status = 200, description = "Tags with per-tag file counts", body = Vec<TagWithCount>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn list_tags(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Query(query): Query<ListTagsQuery>,
) -> Result<Json<Vec<TagWithCount>>, AppError> {
    let tags =
        TagService::list_with_counts(&state.db, query.search.as_deref(), query.sort).await?;
    Ok(Json(tags))
}

#[utoipa::path(
    get,
    path = "/api/tags/{name}",
    params(
        ("name" = String, Path, description = "Tag name"),
        ("search" = Option<String>, Query, description = "Filename substring filter"),
        ("sort_by" = Option<String>, Query, description = "name | created_at | size | type"),
        ("sort_order" = Option<String>, Query, description = "asc | desc"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "The caller's files carrying this tag", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn files_for_tag(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
    Query(mut query): Query<ListFilesQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    query.tag = Some(name);
    let response = query_files(&state.db, &claims.sub, &query).await?;
    Ok(Json(response))
}
