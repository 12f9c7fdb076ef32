use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only version history. Rows are never mutated; a new upload of the
/// same (owner, filename) appends the next version and moves the parent
/// file's `current_version` pointer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub audio_file_id: String,
    pub version: i32,
    pub storage_key: String,
    pub size: i64,
    pub content_hash: String,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::audio_files::Entity",
        from = "Column::AudioFileId",
        to = "super::audio_files::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    AudioFiles,
}

impl Related<super::audio_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AudioFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
