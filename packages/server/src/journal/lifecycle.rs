use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use common::storage::{BlobStore, StorageLocation, StoredBlob};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::error::JournalError;
use super::period::MonthPeriod;
use super::record::{JournalRecord, MediaKind};
use super::repository::JournalRepository;
use crate::analysis::{AnalysisError, Sentiment, SentimentAnalyzer};
use crate::decoder::{DecodedAttachment, DecodedForm};

pub const TITLE_MAX_CHARS: usize = 255;
pub const ACCEPTED_VIDEO_MIME: &str = "video/webm";

const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MIN_ANALYSIS_LEN: usize = 3;

/// Journals of one month, newest first.
#[derive(Debug)]
pub struct MonthListing {
    pub period: MonthPeriod,
    pub journals: Vec<JournalRecord>,
}

/// Mood of the most recent journal written on a day.
#[derive(Clone, Debug, PartialEq, Serialize, utoipa::ToSchema)]
pub struct DayMood {
    pub emotion: Option<String>,
    pub expression: Option<String>,
}

/// Coordinates the blob store, the document store and the analyzer across a
/// journal's create, update and delete.
///
/// The two stores share no transaction. Each step that follows a successful
/// upload either succeeds or deletes what was uploaded, so a persisted record
/// never points at a blob that was not stored. A crash between an upload and
/// the record write can still leak a blob.
pub struct JournalLifecycle {
    repo: Arc<dyn JournalRepository>,
    blobs: Arc<BlobStore>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    analysis_timeout: Duration,
    min_analysis_len: usize,
}

impl JournalLifecycle {
    pub fn new(
        repo: Arc<dyn JournalRepository>,
        blobs: Arc<BlobStore>,
        analyzer: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            repo,
            blobs,
            analyzer,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
            min_analysis_len: DEFAULT_MIN_ANALYSIS_LEN,
        }
    }

    pub fn with_analysis_limits(mut self, timeout: Duration, min_text_len: usize) -> Self {
        self.analysis_timeout = timeout;
        self.min_analysis_len = min_text_len;
        self
    }

    #[instrument(skip(self, form), fields(journal_id = tracing::field::Empty))]
    pub async fn create(
        &self,
        owner_id: &str,
        mut form: DecodedForm,
    ) -> Result<JournalRecord, JournalError> {
        let title = validate_title(form.field("title"))?;
        let note = form.field("note").unwrap_or_default().to_string();
        let media = take_media(&mut form)?;

        let mut record = JournalRecord::new(owner_id, title, note, Utc::now());
        tracing::Span::current().record("journal_id", tracing::field::display(record.id));

        // Video first, then photo.
        let mut uploaded = Vec::with_capacity(media.len());
        for (kind, attachment) in media {
            match self.store_media(owner_id, kind, attachment).await {
                Ok(blob) => {
                    record.set_media(kind, Some(blob.url), Some(blob.location.key().to_string()));
                    uploaded.push(blob.location);
                }
                Err(e) => {
                    self.discard(&uploaded).await;
                    return Err(e);
                }
            }
        }

        let text = format!("{}. {}", record.title, record.note);
        if let Some(sentiment) = self.analyze(&text).await {
            record.apply_sentiment(sentiment);
        }

        if let Err(e) = self.repo.insert(&record).await {
            self.discard(&uploaded).await;
            return Err(e.into());
        }

        if let Err(e) = self.repo.touch_last_entry(owner_id, record.created_at).await {
            warn!(error = %e, "Failed to record last journal activity");
        }

        info!(
            video = record.video_location.is_some(),
            photo = record.photo_location.is_some(),
            analyzed = record.emotion.is_some(),
            "Journal created"
        );
        Ok(record)
    }

    pub async fn get(&self, owner_id: &str, id: Uuid) -> Result<JournalRecord, JournalError> {
        self.load_owned(owner_id, id).await
    }

    /// Partial update: absent fields stay as they are. New media is uploaded
    /// and persisted before the blob it supersedes is deleted.
    #[instrument(skip(self, form))]
    pub async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        mut form: DecodedForm,
    ) -> Result<JournalRecord, JournalError> {
        let mut record = self.load_owned(owner_id, id).await?;

        let title = form.field("title").map(|t| validate_title(Some(t))).transpose()?;
        let note = form.field("note").map(str::to_string);
        let media = take_media(&mut form)?;

        let mut uploaded = Vec::with_capacity(media.len());
        let mut superseded = Vec::new();
        for (kind, attachment) in media {
            match self.store_media(owner_id, kind, attachment).await {
                Ok(blob) => {
                    superseded.extend(self.media_location(&record, kind));
                    record.set_media(kind, Some(blob.url), Some(blob.location.key().to_string()));
                    uploaded.push(blob.location);
                }
                Err(e) => {
                    self.discard(&uploaded).await;
                    return Err(e);
                }
            }
        }

        if let Some(title) = title {
            record.title = title;
        }
        if let Some(note) = note {
            record.note = note;
        }
        record.touch(Utc::now());

        if let Err(e) = self.repo.update(&record).await {
            self.discard(&uploaded).await;
            return Err(e.into());
        }

        self.discard(&superseded).await;
        info!(replaced = uploaded.len(), "Journal updated");
        Ok(record)
    }

    /// Delete the record's blobs, then the record. Blob failures are logged
    /// and do not stop the record from being removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: Uuid) -> Result<(), JournalError> {
        let record = self.load_owned(owner_id, id).await?;

        let video = self.media_location(&record, MediaKind::Video);
        let photo = self.media_location(&record, MediaKind::Photo);
        tokio::join!(self.discard_one(video), self.discard_one(photo));

        if !self.repo.delete(id).await? {
            warn!("Journal vanished before it could be deleted");
        }
        info!("Journal deleted");
        Ok(())
    }

    pub async fn list_month(
        &self,
        owner_id: &str,
        period: MonthPeriod,
    ) -> Result<MonthListing, JournalError> {
        let journals = self.repo.list_by_owner(owner_id, period.range()).await?;
        Ok(MonthListing { period, journals })
    }

    /// Mood per day of month, taken from the latest journal of that day.
    pub async fn mood_calendar(
        &self,
        owner_id: &str,
        period: MonthPeriod,
    ) -> Result<BTreeMap<u32, DayMood>, JournalError> {
        let journals = self.repo.list_by_owner(owner_id, period.range()).await?;
        let mut moods = BTreeMap::new();
        // Newest first, so the first entry seen for a day wins.
        for journal in journals {
            moods.entry(journal.created_at.day()).or_insert(DayMood {
                emotion: journal.emotion,
                expression: journal.expression,
            });
        }
        Ok(moods)
    }

    async fn load_owned(&self, owner_id: &str, id: Uuid) -> Result<JournalRecord, JournalError> {
        let record = self.repo.find(id).await?.ok_or(JournalError::NotFound)?;
        if record.owner_id != owner_id {
            warn!(%id, "Journal requested by a user who does not own it");
            return Err(JournalError::NotOwner);
        }
        Ok(record)
    }

    async fn store_media(
        &self,
        owner_id: &str,
        kind: MediaKind,
        attachment: DecodedAttachment,
    ) -> Result<StoredBlob, JournalError> {
        let blob = self
            .blobs
            .upload(
                attachment.bytes,
                &attachment.mime_type,
                &kind.folder(owner_id),
                &attachment.original_filename,
            )
            .await?;
        Ok(blob)
    }

    /// Where the blob behind `kind` lives, if it lives in this store.
    fn media_location(&self, record: &JournalRecord, kind: MediaKind) -> Option<StorageLocation> {
        let url = record.media_url(kind)?;
        let location = self.blobs.locate(url);
        if location.is_none() {
            warn!(url, "Media URL does not belong to this store, leaving it alone");
        }
        location
    }

    async fn discard(&self, locations: &[StorageLocation]) {
        for location in locations {
            self.discard_one(Some(location.clone())).await;
        }
    }

    async fn discard_one(&self, location: Option<StorageLocation>) {
        let Some(location) = location else {
            return;
        };
        if let Err(e) = self.blobs.delete(&location).await {
            warn!(%location, error = %e, "Failed to delete blob; it is now orphaned");
        }
    }

    async fn analyze(&self, text: &str) -> Option<Sentiment> {
        if text.chars().count() <= self.min_analysis_len {
            return None;
        }
        let outcome = tokio::time::timeout(self.analysis_timeout, self.analyzer.analyze(text))
            .await
            .unwrap_or(Err(AnalysisError::Timeout(self.analysis_timeout)));
        match outcome {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!(error = %e, "Sentiment analysis skipped");
                None
            }
        }
    }
}

fn validate_title(raw: Option<&str>) -> Result<String, JournalError> {
    let title = raw.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(JournalError::Validation("Title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(JournalError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Pull the `video` and `photo` attachments out of `form`, video first, and
/// check their declared types.
fn take_media(
    form: &mut DecodedForm,
) -> Result<Vec<(MediaKind, DecodedAttachment)>, JournalError> {
    let mut media = Vec::new();
    for kind in [MediaKind::Video, MediaKind::Photo] {
        let Some(attachment) = form.take_attachment(kind.field_name()) else {
            continue;
        };
        let mime = attachment.mime_type.to_ascii_lowercase();
        let accepted = match kind {
            MediaKind::Video => mime == ACCEPTED_VIDEO_MIME,
            MediaKind::Photo => mime.starts_with("image/"),
        };
        if !accepted {
            return Err(JournalError::Validation(match kind {
                MediaKind::Video => format!("Video must be {ACCEPTED_VIDEO_MIME}"),
                MediaKind::Photo => "Photo must be an image".to_string(),
            }));
        }
        media.push((kind, attachment));
    }
    for ignored in &form.attachments {
        warn!(field = %ignored.field_name, "Ignoring attachment under an unknown field");
    }
    Ok(media)
}
