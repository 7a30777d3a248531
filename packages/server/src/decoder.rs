//! Streaming decoder for inbound form bodies.
//!
//! Splits one forward-only byte stream into text fields and binary attachments.
//! Attachment bytes are accumulated per part as chunks arrive; nothing touches
//! the disk. Every in-flight upload therefore holds its attachments in memory
//! until the request finishes, so concurrent upload throughput is bounded by
//! available memory (at most `max_file_size` per file part).

use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::{Bytes, BytesMut};
use common::storage::sanitize_filename;
use futures::{Stream, StreamExt, future};
use http_body_util::LengthLimitError;
use tracing::{debug, warn};

/// Per-file ceiling: 50 MiB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Ceiling for non-multipart (JSON) bodies.
const MAX_JSON_BODY: usize = 1024 * 1024;

/// One file part, owned by the request that decoded it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAttachment {
    pub field_name: String,
    /// Sanitized name, safe to embed in storage keys.
    pub original_filename: String,
    /// Name as sent by the client. For diagnostics only.
    pub raw_filename: Option<String>,
    pub mime_type: String,
    pub bytes: Bytes,
    pub size: u64,
}

/// Text fields and attachments of one request body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedForm {
    pub fields: HashMap<String, String>,
    pub attachments: Vec<DecodedAttachment>,
}

impl DecodedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Remove and return the first attachment sent under `field_name`.
    pub fn take_attachment(&mut self, field_name: &str) -> Option<DecodedAttachment> {
        let index = self
            .attachments
            .iter()
            .position(|a| a.field_name == field_name)?;
        Some(self.attachments.remove(index))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A file part grew past the per-file ceiling. The whole request is rejected.
    #[error("File '{field}' exceeds maximum size of {limit} bytes")]
    FileTooLarge { field: String, limit: u64 },
    #[error("Request body exceeds maximum size of {limit} bytes")]
    BodyTooLarge { limit: usize },
    /// The transport refused to deliver more of the body.
    #[error("Request body exceeds the allowed size")]
    BodyLimitExceeded,
}

/// Decodes multipart (and JSON) request bodies.
#[derive(Clone, Copy, Debug)]
pub struct StreamDecoder {
    max_file_size: u64,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

impl StreamDecoder {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Decode `stream` according to `content_type`.
    ///
    /// * `multipart/form-data`: parts with a filename become attachments, the
    ///   rest become fields. Zero-byte file parts are dropped.
    /// * `application/json`: top-level string members become fields; there are
    ///   no attachments.
    /// * anything else: an empty form.
    ///
    /// A malformed or truncated body is not an error: whatever was decoded
    /// before the failure is returned and the failure is logged. Callers
    /// decide whether the partial form is usable. Only the size ceilings
    /// (per file, and the body limit enforced by the transport) fail the call.
    pub async fn decode<S, E>(
        &self,
        stream: S,
        content_type: Option<&str>,
    ) -> Result<DecodedForm, DecodeError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync>> + 'static,
    {
        let Some(content_type) = content_type else {
            return Ok(DecodedForm::default());
        };

        let over_limit = Arc::new(AtomicBool::new(false));
        let stream = end_on_error(stream, over_limit.clone());

        let form = if let Ok(boundary) = multer::parse_boundary(content_type) {
            self.decode_multipart(stream, boundary).await?
        } else if is_json(content_type) {
            decode_json(stream).await?
        } else {
            debug!(content_type, "Body is neither multipart nor JSON, no fields decoded");
            return Ok(DecodedForm::default());
        };

        if over_limit.load(Ordering::Relaxed) {
            return Err(DecodeError::BodyLimitExceeded);
        }
        Ok(form)
    }

    async fn decode_multipart<S>(
        &self,
        stream: S,
        boundary: String,
    ) -> Result<DecodedForm, DecodeError>
    where
        S: Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
    {
        let mut form = DecodedForm::default();
        let mut multipart = multer::Multipart::new(stream, boundary);

        loop {
            let mut field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Multipart body ended abnormally, keeping decoded parts");
                    break;
                }
            };

            let name = field.name().unwrap_or_default().to_string();

            let Some(raw_filename) = field.file_name().map(str::to_string) else {
                match field.text().await {
                    Ok(value) => {
                        form.fields.insert(name, value);
                        continue;
                    }
                    Err(e) => {
                        warn!(field = %name, error = %e, "Failed to read text field");
                        break;
                    }
                }
            };

            let mime_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .or_else(|| {
                    mime_guess::from_path(&raw_filename)
                        .first()
                        .map(|m| m.essence_str().to_string())
                })
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut buffer = BytesMut::new();
            let mut truncated = false;
            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        if (buffer.len() + chunk.len()) as u64 > self.max_file_size {
                            return Err(DecodeError::FileTooLarge {
                                field: name,
                                limit: self.max_file_size,
                            });
                        }
                        buffer.extend_from_slice(&chunk);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(field = %name, error = %e, "File part truncated, discarding it");
                        truncated = true;
                        break;
                    }
                }
            }
            if truncated {
                break;
            }

            if buffer.is_empty() {
                debug!(field = %name, "Skipping empty file part");
                continue;
            }

            let raw_filename = Some(raw_filename).filter(|f| !f.is_empty());
            let bytes = buffer.freeze();
            form.attachments.push(DecodedAttachment {
                original_filename: sanitize_filename(raw_filename.as_deref()),
                raw_filename,
                field_name: name,
                mime_type,
                size: bytes.len() as u64,
                bytes,
            });
        }

        Ok(form)
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// End the body at its first transport error.
///
/// Parsers downstream then see a plain truncation and keep what they already
/// decoded. A body-limit error additionally raises `over_limit`.
fn end_on_error<S, E>(
    stream: S,
    over_limit: Arc<AtomicBool>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    stream.scan((), move |_, item| {
        let next = match item {
            Ok(chunk) => Some(Ok(chunk)),
            Err(e) => {
                let e: Box<dyn StdError + Send + Sync> = e.into();
                if is_length_limit(&*e) {
                    over_limit.store(true, Ordering::Relaxed);
                } else {
                    warn!(error = %e, "Body stream failed, keeping decoded parts");
                }
                None
            }
        };
        future::ready(next)
    })
}

fn is_length_limit(error: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(error), |e| (*e).source()).any(|e| e.is::<LengthLimitError>())
}

async fn decode_json<S>(stream: S) -> Result<DecodedForm, DecodeError>
where
    S: Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
{
    let mut form = DecodedForm::default();
    let mut body = BytesMut::new();
    let mut stream = pin!(stream);

    while let Some(Ok(chunk)) = stream.next().await {
        if body.len() + chunk.len() > MAX_JSON_BODY {
            return Err(DecodeError::BodyTooLarge {
                limit: MAX_JSON_BODY,
            });
        }
        body.extend_from_slice(&chunk);
    }

    match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&body) {
        Ok(object) => {
            for (key, value) in object {
                if let serde_json::Value::String(s) = value {
                    form.fields.insert(key, s);
                }
            }
        }
        Err(e) => warn!(error = %e, "JSON body is not an object"),
    }

    Ok(form)
}
