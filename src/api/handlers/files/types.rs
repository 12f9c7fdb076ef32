use crate::entities::{audio_files, file_versions};
use crate::services::tag_service::TagWithCount;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
    pub version: i32,
    pub duration_ms: Option<i64>,
    pub has_image: bool,
    pub tags: Vec<String>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl FileResponse {
    pub fn from_model(file: audio_files::Model, tags: Vec<String>) -> Self {
        Self {
            id: file.id,
            name: file.file_name,
            mime_type: file.mime_type,
            size: file.size,
            version: file.current_version,
            duration_ms: file.duration_ms,
            has_image: file.image_key.is_some(),
            tags,
            created_at: file.created_at.unwrap_or_else(Utc::now),
            updated_at: file.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
    pub version: i32,
    pub duplicate: bool,
    pub processing_time_ms: u64,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub file: UploadedFile,
}

#[derive(Serialize, ToSchema)]
pub struct VersionResponse {
    pub version: i32,
    pub size: i64,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<file_versions::Model> for VersionResponse {
    fn from(v: file_versions::Model) -> Self {
        Self {
            version: v.version,
            size: v.size,
            created_at: v.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FileInfoResponse {
    #[serde(flatten)]
    pub file: FileResponse,
    pub versions: Vec<VersionResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct RenameRequest {
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    Size,
    #[serde(rename = "type")]
    Type,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Default, Deserialize)]
pub struct ListFilesQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    #[serde(default, alias = "sortBy")]
    pub sort_by: SortField,
    #[serde(default, alias = "sortOrder")]
    pub sort_order: SortOrder,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

#[derive(Serialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    pub tags: Vec<TagWithCount>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
pub struct StreamQuery {
    pub version: Option<i32>,
}
