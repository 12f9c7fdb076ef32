use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::object_keys;
use crate::services::storage::StorageService;
use crate::services::tag_service::TagService;
use crate::services::media_probe;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

pub struct NewUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub tags: Vec<String>,
}

pub struct StoredFile {
    pub file: audio_files::Model,
    pub version: i32,
    pub duplicate: bool,
}

pub struct FileService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
}

impl FileService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>) -> Self {
        Self { db, storage }
    }

    /// Store an upload as a brand-new file, the next version of an existing
    /// (owner, filename), or a no-op duplicate when the content matches the
    /// current version. Tags are upserted and attached in every case.
    ///
    /// The blob is written before the metadata rows; a metadata failure
    /// after that point leaves an orphaned object behind, which is logged
    /// and accepted rather than compensated.
    pub async fn process_upload(
        &self,
        owner_id: &str,
        upload: NewUpload,
    ) -> Result<StoredFile, AppError> {
        let content_hash = hex::encode(Sha256::digest(&upload.data));
        let size = upload.data.len() as i64;
        let (base_name, ext) = object_keys::split_name(&upload.file_name);

        let existing = AudioFiles::find()
            .filter(audio_files::Column::UserId.eq(owner_id))
            .filter(audio_files::Column::FileName.eq(&upload.file_name))
            .one(&self.db)
            .await?;

        let tags = TagService::upsert_tags(&self.db, &upload.tags).await?;

        if let Some(file) = &existing {
            let current = FileVersions::find()
                .filter(file_versions::Column::AudioFileId.eq(&file.id))
                .filter(file_versions::Column::Version.eq(file.current_version))
                .one(&self.db)
                .await?;

            if let Some(current) = current
                && current.content_hash == content_hash
                && current.size == size
            {
                TagService::attach_tags(&self.db, &file.id, &tags).await?;
                tracing::info!(
                    "Duplicate upload of '{}' by {}, keeping v{}",
                    file.file_name,
                    owner_id,
                    file.current_version
                );
                return Ok(StoredFile {
                    file: file.clone(),
                    version: file.current_version,
                    duplicate: true,
                });
            }
        }

        // Next version comes from the object listing, not the metadata row.
        // Concurrent uploads of the same filename can compute the same
        // number; the later metadata write wins.
        let version = object_keys::next_version(self.storage.as_ref(), owner_id, &base_name)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list object versions: {}", e);
                AppError::Internal("Failed to resolve file version".to_string())
            })?;

        let key = object_keys::version_key(owner_id, &base_name, version, &ext);
        let duration_ms = media_probe::duration_ms(&upload.data);

        self.storage
            .put_object(&key, upload.data, &upload.mime_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store object '{}': {}", key, e);
                AppError::Internal("Failed to store file".to_string())
            })?;

        let file = match existing {
            Some(file) => {
                let mut active: audio_files::ActiveModel = file.into();
                active.mime_type = Set(upload.mime_type.clone());
                active.size = Set(size);
                active.current_version = Set(version);
                active.storage_key = Set(key.clone());
                active.duration_ms = Set(duration_ms);
                active.updated_at = Set(Some(Utc::now()));
                Self::note_orphan(active.update(&self.db).await, &key)?
            }
            None => {
                let active = audio_files::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(owner_id.to_string()),
                    file_name: Set(upload.file_name.clone()),
                    mime_type: Set(upload.mime_type.clone()),
                    size: Set(size),
                    current_version: Set(version),
                    storage_key: Set(key.clone()),
                    image_key: Set(None),
                    duration_ms: Set(duration_ms),
                    created_at: Set(Some(Utc::now())),
                    updated_at: Set(Some(Utc::now())),
                };
                Self::note_orphan(active.insert(&self.db).await, &key)?
            }
        };

        let version_row = file_versions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            audio_file_id: Set(file.id.clone()),
            version: Set(version),
            storage_key: Set(key.clone()),
            size: Set(size),
            content_hash: Set(content_hash),
            created_at: Set(Some(Utc::now())),
        };
        Self::note_orphan(version_row.insert(&self.db).await, &key)?;

        TagService::attach_tags(&self.db, &file.id, &tags).await?;

        Ok(StoredFile {
            file,
            version,
            duplicate: false,
        })
    }

    /// Remove every stored version plus the cover image (best effort), then
    /// delete the metadata rows.
    pub async fn delete_file(&self, file: audio_files::Model) -> Result<(), AppError> {
        let versions = FileVersions::find()
            .filter(file_versions::Column::AudioFileId.eq(&file.id))
            .all(&self.db)
            .await?;

        for version in &versions {
            if let Err(e) = self.storage.remove_object(&version.storage_key).await {
                tracing::warn!(
                    "Failed to remove object '{}' while deleting file {}: {}",
                    version.storage_key,
                    file.id,
                    e
                );
            }
        }

        if let Some(image_key) = &file.image_key
            && let Err(e) = self.storage.remove_object(image_key).await
        {
            tracing::warn!(
                "Failed to remove cover '{}' while deleting file {}: {}",
                image_key,
                file.id,
                e
            );
        }

        FileTags::delete_many()
            .filter(file_tags::Column::AudioFileId.eq(&file.id))
            .exec(&self.db)
            .await?;
        PackFiles::delete_many()
            .filter(pack_files::Column::AudioFileId.eq(&file.id))
            .exec(&self.db)
            .await?;
        FileVersions::delete_many()
            .filter(file_versions::Column::AudioFileId.eq(&file.id))
            .exec(&self.db)
            .await?;

        file.delete(&self.db).await?;
        Ok(())
    }

    pub async fn versions(&self, audio_file_id: &str) -> Result<Vec<file_versions::Model>, AppError> {
        let versions = FileVersions::find()
            .filter(file_versions::Column::AudioFileId.eq(audio_file_id))
            .order_by_asc(file_versions::Column::Version)
            .all(&self.db)
            .await?;
        Ok(versions)
    }

    /// Resolve the storage key to serve: the current version, or a pinned
    /// historical version when requested.
    pub async fn resolve_storage_key(
        &self,
        file: &audio_files::Model,
        version: Option<i32>,
    ) -> Result<String, AppError> {
        match version {
            None => Ok(file.storage_key.clone()),
            Some(v) if v == file.current_version => Ok(file.storage_key.clone()),
            Some(v) => {
                let row = FileVersions::find()
                    .filter(file_versions::Column::AudioFileId.eq(&file.id))
                    .filter(file_versions::Column::Version.eq(v))
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound("Version not found".to_string()))?;
                Ok(row.storage_key)
            }
        }
    }

    fn note_orphan<T>(res: Result<T, sea_orm::DbErr>, key: &str) -> Result<T, AppError> {
        res.map_err(|e| {
            tracing::warn!(
                "Metadata write failed after object '{}' was stored; the object is now orphaned: {}",
                key,
                e
            );
            AppError::from(e)
        })
    }
}
