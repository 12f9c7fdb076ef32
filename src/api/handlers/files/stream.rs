use crate::api::error::AppError;
use crate::entities::{audio_files, prelude::*};
use crate::utils::auth::Claims;
use crate::utils::http_range::parse_range_header;
use axum::{
    Extension,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use sea_orm::EntityTrait;
use tokio_util::io::ReaderStream;

use super::types::StreamQuery;

#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(
        ("id" = String, Path, description = "File ID"),
        ("version" = Option<i32>, Query, description = "Pin a specific version instead of the current one")
    ),
    responses(
        (status = 200, description = "Full audio stream"),
        (status = 206, description = "Partial content for a Range request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "File or version not found"),
        (status = 416, description = "Range not satisfiable")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn stream_file(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(file_id): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let file = AudioFiles::find_by_id(&file_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::NotFound("File not found".to_string()))?;

    super::ensure_owner_or_admin(&state, &claims, &file).await?;

    let key = state
        .file_service
        .resolve_storage_key(&file, query.version)
        .await?;

    serve_object(&state, &file, &key, &headers).await
}

/// Stream an object in full (200) or as a single byte range (206).
/// Shared by the private route above and the pack share route.
pub(crate) async fn serve_object(
    state: &crate::AppState,
    file: &audio_files::Model,
    key: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let stat = state.storage.stat_object(key).await.map_err(|e| {
        tracing::error!("Failed to stat object '{}': {}", key, e);
        AppError::Internal("Failed to retrieve file".to_string())
    })?;
    let total_size = stat.size;

    let content_disposition = inline_disposition(&file.file_name);

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    if let Some(raw) = range_header {
        let range = parse_range_header(raw, total_size)
            .ok_or(AppError::RangeNotSatisfiable(total_size))?;

        let s3_res = state
            .storage
            .get_object_range(key, range.start, range.end)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get object range for '{}': {}", key, e);
                AppError::Internal("Failed to retrieve file range".to_string())
            })?;

        let body = Body::from_stream(ReaderStream::new(s3_res.body.into_async_read()));

        let mut response = (
            [
                (header::CONTENT_TYPE, file.mime_type.clone()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::CONTENT_DISPOSITION, content_disposition),
            ],
            body,
        )
            .into_response();

        *response.status_mut() = StatusCode::PARTIAL_CONTENT;

        let content_range = range.content_range(total_size);
        if let Ok(h_val) = content_range.parse() {
            response.headers_mut().insert(header::CONTENT_RANGE, h_val);
        }
        response.headers_mut().insert(
            header::CONTENT_LENGTH,
            range
                .len()
                .to_string()
                .parse()
                .unwrap_or(header::HeaderValue::from_static("0")),
        );

        return Ok(response);
    }

    let s3_res = state.storage.get_object(key).await.map_err(|e| {
        tracing::error!("Failed to get object stream for '{}': {}", key, e);
        AppError::Internal("Failed to retrieve file".to_string())
    })?;

    let body = Body::from_stream(ReaderStream::new(s3_res.body.into_async_read()));

    let mut response = (
        [
            (header::CONTENT_TYPE, file.mime_type.clone()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        body,
    )
        .into_response();

    response.headers_mut().insert(
        header::CONTENT_LENGTH,
        total_size
            .to_string()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("0")),
    );

    Ok(response)
}

/// RFC 5987 inline disposition: ASCII fallback plus percent-encoded UTF-8.
fn inline_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}
