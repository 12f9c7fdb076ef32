use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::tag_service::{TagService, TagSort};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, RelationTrait,
};

use super::types::*;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

#[utoipa::path(
    get,
    path = "/api/files",
    params(
        ("search" = Option<String>, Query, description = "Filename substring, case-insensitive"),
        ("tag" = Option<String>, Query, description = "Only files carrying this tag"),
        ("sort_by" = Option<String>, Query, description = "name | created_at | size | type"),
        ("sort_order" = Option<String>, Query, description = "asc | desc"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paged file listing with tag counts", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    let response = query_files(&state.db, &claims.sub, &query).await?;
    Ok(Json(response))
}

/// Paged listing of one user's files. Also backs the per-tag listing.
pub(crate) async fn query_files(
    db: &DatabaseConnection,
    user_id: &str,
    query: &ListFilesQuery,
) -> Result<FileListResponse, AppError> {
    let mut cond = Condition::all().add(audio_files::Column::UserId.eq(user_id));

    if let Some(search) = &query.search {
        // Case-insensitive substring, portable across SQLite and Postgres
        cond = cond.add(
            Expr::expr(Func::lower(Expr::col(audio_files::Column::FileName)))
                .like(format!("%{}%", search.to_lowercase())),
        );
    }

    let mut select = AudioFiles::find().filter(cond);

    if let Some(tag) = &query.tag {
        select = select
            .join(JoinType::InnerJoin, audio_files::Relation::FileTags.def())
            .join(JoinType::InnerJoin, file_tags::Relation::Tags.def())
            .filter(tags::Column::Name.eq(tag));
    }

    let column = match query.sort_by {
        SortField::Name => audio_files::Column::FileName,
        SortField::CreatedAt => audio_files::Column::CreatedAt,
        SortField::Size => audio_files::Column::Size,
        SortField::Type => audio_files::Column::MimeType,
    };
    select = match query.sort_order {
        SortOrder::Asc => select.order_by_asc(column),
        SortOrder::Desc => select.order_by_desc(column),
    };

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);

    let paginator = select.paginate(db, limit);
    let totals = paginator.num_items_and_pages().await?;
    let page_files = paginator.fetch_page(page - 1).await?;

    let mut files = Vec::with_capacity(page_files.len());
    for file in page_files {
        let tags = TagService::tags_for_file(db, &file.id).await?;
        files.push(FileResponse::from_model(file, tags));
    }

    let tag_counts = TagService::list_with_counts(db, None, TagSort::Count).await?;

    Ok(FileListResponse {
        files,
        tags: tag_counts,
        pagination: Pagination {
            current_page: page,
            total_pages: totals.number_of_pages,
            total_items: totals.number_of_items,
            items_per_page: limit,
        },
    })
}
