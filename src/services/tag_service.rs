use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSort {
    /// Most-used first
    #[default]
    Count,
    /// Alphabetical
    Name,
}

#[derive(Serialize, ToSchema)]
pub struct TagWithCount {
    pub id: String,
    pub name: String,
    pub file_count: i64,
}

pub struct TagService;

impl TagService {
    /// Create-if-absent by name, returning the tag rows for `names`.
    /// Blank entries are skipped; names are stored trimmed, as given.
    pub async fn upsert_tags(
        db: &DatabaseConnection,
        names: &[String],
    ) -> Result<Vec<tags::Model>, AppError> {
        let mut result = Vec::new();

        for raw in names {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if result.iter().any(|t: &tags::Model| t.name == name) {
                continue;
            }

            let existing = Tags::find()
                .filter(tags::Column::Name.eq(name))
                .one(db)
                .await?;

            let tag = match existing {
                Some(tag) => tag,
                None => {
                    let tag = tags::ActiveModel {
                        id: Set(Uuid::new_v4().to_string()),
                        name: Set(name.to_string()),
                    };
                    tag.insert(db).await?
                }
            };
            result.push(tag);
        }

        Ok(result)
    }

    /// Associate tags with a file, skipping links that already exist.
    pub async fn attach_tags(
        db: &DatabaseConnection,
        audio_file_id: &str,
        tags: &[tags::Model],
    ) -> Result<(), AppError> {
        for tag in tags {
            let exists = FileTags::find_by_id((audio_file_id.to_string(), tag.id.clone()))
                .one(db)
                .await?
                .is_some();

            if !exists {
                let link = file_tags::ActiveModel {
                    audio_file_id: Set(audio_file_id.to_string()),
                    tag_id: Set(tag.id.clone()),
                };
                link.insert(db).await?;
            }
        }
        Ok(())
    }

    pub async fn tags_for_file(
        db: &DatabaseConnection,
        audio_file_id: &str,
    ) -> Result<Vec<String>, AppError> {
        let items = Tags::find()
            .join(JoinType::InnerJoin, tags::Relation::FileTags.def())
            .filter(file_tags::Column::AudioFileId.eq(audio_file_id))
            .order_by_asc(tags::Column::Name)
            .all(db)
            .await?;

        Ok(items.into_iter().map(|t| t.name).collect())
    }

    /// List tags with per-tag file counts. Orphan tags (no remaining files)
    /// are included with a count of zero; they are never pruned.
    pub async fn list_with_counts(
        db: &DatabaseConnection,
        search: Option<&str>,
        sort: TagSort,
    ) -> Result<Vec<TagWithCount>, AppError> {
        let mut query = Tags::find()
            .select_only()
            .column(tags::Column::Id)
            .column(tags::Column::Name)
            .column_as(file_tags::Column::TagId.count(), "file_count")
            .join(JoinType::LeftJoin, tags::Relation::FileTags.def())
            .group_by(tags::Column::Id)
            .group_by(tags::Column::Name);

        if let Some(search) = search {
            // Case-insensitive substring match, portable across backends
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(tags::Column::Name)))
                    .like(format!("%{}%", search.to_lowercase())),
            );
        }

        query = match sort {
            TagSort::Count => query
                .order_by_desc(Expr::col(Alias::new("file_count")))
                .order_by_asc(tags::Column::Name),
            TagSort::Name => query.order_by_asc(tags::Column::Name),
        };

        let rows: Vec<(String, String, i64)> = query.into_tuple().all(db).await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, file_count)| TagWithCount {
                id,
                name,
                file_count,
            })
            .collect())
    }
}
