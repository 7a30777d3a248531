pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiAnalyzer;

/// Sentiment derived from a journal's text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Sentiment {
    /// One English adjective, e.g. `Tired`.
    pub emotion: String,
    /// One emoji.
    pub expression: String,
    /// 0.0 - 1.0.
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned HTTP {0}")]
    Status(u16),
    #[error("analysis reply could not be parsed: {0}")]
    Malformed(String),
    #[error("analysis did not finish within {0:?}")]
    Timeout(std::time::Duration),
}

/// Best-effort text analysis. `Ok(None)` means "no opinion".
///
/// Callers must treat every error as absence of enrichment.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Option<Sentiment>, AnalysisError>;
}

/// Used when no analysis backend is configured.
pub struct DisabledAnalyzer;

#[async_trait]
impl SentimentAnalyzer for DisabledAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<Option<Sentiment>, AnalysisError> {
        Ok(None)
    }
}
