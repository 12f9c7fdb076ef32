use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use base64::Engine;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, RelationTrait, Set,
};
use std::collections::HashSet;
use uuid::Uuid;

pub struct PackService;

impl PackService {
    /// Generate a URL-safe random token granting public read access.
    pub fn generate_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..24).map(|_| rng.r#gen()).collect();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Verify every id refers to a file owned by `user_id`, returning the
    /// deduplicated id set.
    async fn checked_file_ids(
        db: &DatabaseConnection,
        user_id: &str,
        file_ids: &[String],
    ) -> Result<Vec<String>, AppError> {
        let unique: Vec<String> = file_ids
            .iter()
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if unique.is_empty() {
            return Ok(unique);
        }

        let owned = AudioFiles::find()
            .filter(audio_files::Column::Id.is_in(unique.clone()))
            .filter(audio_files::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        if owned.len() != unique.len() {
            return Err(AppError::BadRequest(
                "One or more file ids do not exist or are not yours".to_string(),
            ));
        }

        Ok(unique)
    }

    async fn link_files(
        db: &DatabaseConnection,
        pack_id: &str,
        file_ids: &[String],
    ) -> Result<(), AppError> {
        for file_id in file_ids {
            let link = pack_files::ActiveModel {
                pack_id: Set(pack_id.to_string()),
                audio_file_id: Set(file_id.clone()),
            };
            link.insert(db).await?;
        }
        Ok(())
    }

    pub async fn create_pack(
        db: &DatabaseConnection,
        user_id: &str,
        name: String,
        description: Option<String>,
        file_ids: &[String],
    ) -> Result<packs::Model, AppError> {
        let file_ids = Self::checked_file_ids(db, user_id, file_ids).await?;

        let pack = packs::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            name: Set(name),
            description: Set(description),
            share_token: Set(Self::generate_token()),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
        };
        let pack = pack.insert(db).await?;

        Self::link_files(db, &pack.id, &file_ids).await?;

        Ok(pack)
    }

    pub async fn list_user_packs(
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<Vec<packs::Model>, AppError> {
        let packs = Packs::find()
            .filter(packs::Column::UserId.eq(user_id))
            .order_by_desc(packs::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(packs)
    }

    pub async fn get_owned_pack(
        db: &DatabaseConnection,
        pack_id: &str,
        user_id: &str,
    ) -> Result<packs::Model, AppError> {
        let pack = Packs::find_by_id(pack_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Pack not found".to_string()))?;

        if pack.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this pack".to_string(),
            ));
        }

        Ok(pack)
    }

    /// Update a pack. When `file_ids` is provided the association set is
    /// replaced wholesale; callers submit the complete desired set.
    pub async fn update_pack(
        db: &DatabaseConnection,
        pack_id: &str,
        user_id: &str,
        name: Option<String>,
        description: Option<String>,
        file_ids: Option<&[String]>,
    ) -> Result<packs::Model, AppError> {
        let pack = Self::get_owned_pack(db, pack_id, user_id).await?;

        if let Some(file_ids) = file_ids {
            let file_ids = Self::checked_file_ids(db, user_id, file_ids).await?;

            PackFiles::delete_many()
                .filter(pack_files::Column::PackId.eq(pack_id))
                .exec(db)
                .await?;

            Self::link_files(db, pack_id, &file_ids).await?;
        }

        let mut active: packs::ActiveModel = pack.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        Ok(updated)
    }

    /// Delete a pack and its association rows. Member files and their
    /// storage objects are left untouched.
    pub async fn delete_pack(
        db: &DatabaseConnection,
        pack_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let pack = Self::get_owned_pack(db, pack_id, user_id).await?;

        PackFiles::delete_many()
            .filter(pack_files::Column::PackId.eq(pack_id))
            .exec(db)
            .await?;

        pack.delete(db).await?;
        Ok(())
    }

    /// Public lookup by share token; unknown tokens are indistinguishable
    /// from deleted packs.
    pub async fn get_by_token(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<packs::Model, AppError> {
        let pack = Packs::find()
            .filter(packs::Column::ShareToken.eq(token))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Pack not found".to_string()))?;
        Ok(pack)
    }

    pub async fn files_in_pack(
        db: &DatabaseConnection,
        pack_id: &str,
    ) -> Result<Vec<audio_files::Model>, AppError> {
        let files = AudioFiles::find()
            .join(JoinType::InnerJoin, audio_files::Relation::PackFiles.def())
            .filter(pack_files::Column::PackId.eq(pack_id))
            .order_by_asc(audio_files::Column::FileName)
            .all(db)
            .await?;
        Ok(files)
    }

    pub async fn pack_contains_file(
        db: &DatabaseConnection,
        pack_id: &str,
        audio_file_id: &str,
    ) -> Result<bool, AppError> {
        let link = PackFiles::find_by_id((pack_id.to_string(), audio_file_id.to_string()))
            .one(db)
            .await?;
        Ok(link.is_some())
    }
}
