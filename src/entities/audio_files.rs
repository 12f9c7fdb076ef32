use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audio_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub current_version: i32,
    pub storage_key: String,
    pub image_key: Option<String>,
    pub duration_ms: Option<i64>,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::file_versions::Entity")]
    FileVersions,
    #[sea_orm(has_many = "super::file_tags::Entity")]
    FileTags,
    #[sea_orm(has_many = "super::pack_files::Entity")]
    PackFiles,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::file_versions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileVersions.def()
    }
}

impl Related<super::file_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileTags.def()
    }
}

impl Related<super::pack_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
