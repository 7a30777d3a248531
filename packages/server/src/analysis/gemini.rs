use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{AnalysisError, Sentiment, SentimentAnalyzer};
use crate::config::AnalysisConfig;

const DEFAULT_EMOTION: &str = "Neutral";
const DEFAULT_EXPRESSION: &str = "😐";
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Sentiment analysis through the Gemini `generateContent` REST API.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiAnalyzer {
    pub fn new(config: &AnalysisConfig, api_key: String) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

fn prompt(text: &str) -> String {
    format!(
        r#"Analyze the following journal text as an empathetic psychologist. Determine:
1. "emotion": one English adjective that best captures the writer's dominant feeling (e.g. Happy, Sad, Anxious, Grateful, Tired, Excited, Angry, Calm).
2. "expression": one emoji that best matches the tone of the text.
3. "confidence": a decimal from 0.0 to 1.0 for how sure you are.

Reply with valid JSON only, no markdown.
Format: {{"emotion": "string", "expression": "string", "confidence": number}}

Journal text: "{text}""#
    )
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct RawSentiment {
    emotion: Option<String>,
    expression: Option<String>,
    confidence: Option<f64>,
}

/// Parse the model's text reply, tolerating markdown code fences.
pub(crate) fn parse_reply(reply: &str) -> Result<Sentiment, AnalysisError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let raw: RawSentiment = serde_json::from_str(cleaned.trim())
        .map_err(|e| AnalysisError::Malformed(e.to_string()))?;

    Ok(Sentiment {
        emotion: raw
            .emotion
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EMOTION.into()),
        expression: raw
            .expression
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPRESSION.into()),
        confidence: raw
            .confidence
            .filter(|c| c.is_finite() && *c > 0.0)
            .map(|c| c.min(1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
    })
}

#[async_trait]
impl SentimentAnalyzer for GeminiAnalyzer {
    #[instrument(skip_all, fields(len = text.len()))]
    async fn analyze(&self, text: &str) -> Result<Option<Sentiment>, AnalysisError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt(text) }] }]
        });

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let generated: GenerateResponse = response.json().await?;
        let reply: String = generated
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Ok(None);
        }

        parse_reply(&reply).map(Some)
    }
}
