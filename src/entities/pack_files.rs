use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pack_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pack_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub audio_file_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::packs::Entity",
        from = "Column::PackId",
        to = "super::packs::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Packs,
    #[sea_orm(
        belongs_to = "super::audio_files::Entity",
        from = "Column::AudioFileId",
        to = "super::audio_files::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    AudioFiles,
}

impl Related<super::packs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Packs.def()
    }
}

impl Related<super::audio_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AudioFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
