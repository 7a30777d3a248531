use std::ops::Range;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::record::JournalRecord;
use super::repository::JournalRepository;
use crate::entity::{journal, user};

/// Journals and users in a relational database through SeaORM.
pub struct SeaOrmJournalRepository {
    db: DatabaseConnection,
}

impl SeaOrmJournalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(record: &JournalRecord) -> journal::ActiveModel {
    journal::ActiveModel {
        id: Set(record.id),
        owner_id: Set(record.owner_id.clone()),
        title: Set(record.title.clone()),
        note: Set(record.note.clone()),
        video_location: Set(record.video_location.clone()),
        photo_location: Set(record.photo_location.clone()),
        derived_path: Set(record.derived_path.clone()),
        emotion: Set(record.emotion.clone()),
        expression: Set(record.expression.clone()),
        confidence: Set(record.confidence),
        tags: Set(record.tags.clone()),
        insight_highlight: Set(record.insight_highlight.clone()),
        insight_suggestion: Set(record.insight_suggestion.clone()),
        insight_strategy: Set(record.insight_strategy.clone()),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

#[async_trait]
impl JournalRepository for SeaOrmJournalRepository {
    async fn insert(&self, record: &JournalRecord) -> Result<(), DbErr> {
        journal::Entity::insert(active_model(record))
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<JournalRecord>, DbErr> {
        Ok(journal::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(JournalRecord::from))
    }

    async fn update(&self, record: &JournalRecord) -> Result<(), DbErr> {
        // Enrichment columns are owned by the enrichment job; leave them alone.
        let mut model = active_model(record);
        model.tags = sea_orm::NotSet;
        model.insight_highlight = sea_orm::NotSet;
        model.insight_suggestion = sea_orm::NotSet;
        model.insight_strategy = sea_orm::NotSet;
        model.created_at = sea_orm::NotSet;
        model.owner_id = sea_orm::NotSet;
        model.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = journal::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        range: Range<DateTime<Utc>>,
    ) -> Result<Vec<JournalRecord>, DbErr> {
        let models = journal::Entity::find()
            .filter(journal::Column::OwnerId.eq(owner_id))
            .filter(journal::Column::CreatedAt.gte(range.start))
            .filter(journal::Column::CreatedAt.lt(range.end))
            .order_by_desc(journal::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(JournalRecord::from).collect())
    }

    async fn touch_last_entry(&self, owner_id: &str, at: DateTime<Utc>) -> Result<(), DbErr> {
        let model = user::ActiveModel {
            id: Set(owner_id.to_string()),
            last_entry: Set(Some(at)),
        };
        user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_column(user::Column::LastEntry)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
