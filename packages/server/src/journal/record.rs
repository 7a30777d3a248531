use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Sentiment;
use crate::entity::journal;

/// Kinds of media a journal can carry, one of each at most.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Photo,
}

impl MediaKind {
    /// Multipart field the media is uploaded under.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Photo => "photo",
        }
    }

    /// Storage folder for `owner_id`'s media of this kind.
    pub fn folder(self, owner_id: &str) -> String {
        match self {
            MediaKind::Video => format!("journals/{owner_id}/videos"),
            MediaKind::Photo => format!("journals/{owner_id}/photos"),
        }
    }
}

/// A journal entry as stored in the document store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JournalRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub note: String,
    pub video_location: Option<String>,
    pub photo_location: Option<String>,
    /// Object key behind `photo_location`; kept in lockstep with it.
    pub derived_path: Option<String>,
    pub emotion: Option<String>,
    pub expression: Option<String>,
    pub confidence: Option<f64>,
    /// Enrichment output. Never written by the lifecycle, only carried along.
    #[schema(value_type = Option<Object>)]
    pub tags: Option<serde_json::Value>,
    pub insight_highlight: Option<String>,
    pub insight_suggestion: Option<String>,
    pub insight_strategy: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalRecord {
    /// A fresh record with no media, no sentiment and no enrichment.
    pub fn new(owner_id: &str, title: String, note: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title,
            note,
            video_location: None,
            photo_location: None,
            derived_path: None,
            emotion: None,
            expression: None,
            confidence: None,
            tags: None,
            insight_highlight: None,
            insight_suggestion: None,
            insight_strategy: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_sentiment(&mut self, sentiment: Sentiment) {
        self.emotion = Some(sentiment.emotion);
        self.expression = Some(sentiment.expression);
        self.confidence = Some(sentiment.confidence);
    }

    pub fn media_url(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Video => self.video_location.as_deref(),
            MediaKind::Photo => self.photo_location.as_deref(),
        }
    }

    /// Point `kind` at a new blob (or at nothing).
    pub fn set_media(&mut self, kind: MediaKind, url: Option<String>, key: Option<String>) {
        match kind {
            MediaKind::Video => self.video_location = url,
            MediaKind::Photo => {
                self.photo_location = url;
                self.derived_path = key;
            }
        }
    }

    /// Advance `updated_at` to `now`, or past the previous value if the clock
    /// has not moved since.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::milliseconds(1)
        };
    }
}

impl From<journal::Model> for JournalRecord {
    fn from(model: journal::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            note: model.note,
            video_location: model.video_location,
            photo_location: model.photo_location,
            derived_path: model.derived_path,
            emotion: model.emotion,
            expression: model.expression,
            confidence: model.confidence,
            tags: model.tags,
            insight_highlight: model.insight_highlight,
            insight_suggestion: model.insight_suggestion,
            insight_strategy: model.insight_strategy,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
