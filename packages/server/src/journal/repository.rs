use std::collections::HashMap;
use std::ops::Range;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use super::record::JournalRecord;

/// Document-store access for journals and the owning user's activity stamp.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn insert(&self, record: &JournalRecord) -> Result<(), DbErr>;

    async fn find(&self, id: Uuid) -> Result<Option<JournalRecord>, DbErr>;

    /// Overwrite an existing record's mutable fields. Ownership, `created_at`
    /// and enrichment output are left as stored.
    async fn update(&self, record: &JournalRecord) -> Result<(), DbErr>;

    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, DbErr>;

    /// Journals of `owner_id` with `created_at` in `range`, newest first.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        range: Range<DateTime<Utc>>,
    ) -> Result<Vec<JournalRecord>, DbErr>;

    /// Record `at` as the owner's latest journal activity.
    async fn touch_last_entry(&self, owner_id: &str, at: DateTime<Utc>) -> Result<(), DbErr>;
}

/// In-process repository for tests and the memory-only deployment mode.
#[derive(Default)]
pub struct MemoryJournalRepository {
    journals: RwLock<HashMap<Uuid, JournalRecord>>,
    last_entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.journals.read().map(|j| j.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_entry(&self, owner_id: &str) -> Option<DateTime<Utc>> {
        self.last_entries
            .read()
            .ok()
            .and_then(|m| m.get(owner_id).copied())
    }
}

fn poisoned<T>(_: T) -> DbErr {
    DbErr::Custom("memory repository lock poisoned".into())
}

#[async_trait]
impl JournalRepository for MemoryJournalRepository {
    async fn insert(&self, record: &JournalRecord) -> Result<(), DbErr> {
        let mut journals = self.journals.write().map_err(poisoned)?;
        if journals.contains_key(&record.id) {
            return Err(DbErr::Custom(format!("journal {} already exists", record.id)));
        }
        journals.insert(record.id, record.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<JournalRecord>, DbErr> {
        Ok(self.journals.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn update(&self, record: &JournalRecord) -> Result<(), DbErr> {
        let mut journals = self.journals.write().map_err(poisoned)?;
        match journals.get_mut(&record.id) {
            Some(existing) => {
                // Enrichment fields and identity are not the updater's to change.
                let mut updated = record.clone();
                updated.owner_id = existing.owner_id.clone();
                updated.created_at = existing.created_at;
                updated.tags = existing.tags.take();
                updated.insight_highlight = existing.insight_highlight.take();
                updated.insight_suggestion = existing.insight_suggestion.take();
                updated.insight_strategy = existing.insight_strategy.take();
                *existing = updated;
                Ok(())
            }
            None => Err(DbErr::RecordNotUpdated),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        Ok(self.journals.write().map_err(poisoned)?.remove(&id).is_some())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        range: Range<DateTime<Utc>>,
    ) -> Result<Vec<JournalRecord>, DbErr> {
        let mut found: Vec<JournalRecord> = self
            .journals
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|r| r.owner_id == owner_id && range.contains(&r.created_at))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn touch_last_entry(&self, owner_id: &str, at: DateTime<Utc>) -> Result<(), DbErr> {
        self.last_entries
            .write()
            .map_err(poisoned)?
            .insert(owner_id.to_string(), at);
        Ok(())
    }
}
