//! Whisper transcription adapter
//!
//! Talks to an OpenAI-compatible `/audio/transcriptions` endpoint and asks for
//! the verbose JSON shape, which carries per-segment timestamps.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::toml_config::TranscriptionConfig;
use crate::domain::errors::TranscriptionServiceError;
use crate::domain::model::TranscriptSegment;
use crate::ports::TranscriptionPort;

const RESPONSE_FORMAT: &str = "verbose_json";

#[derive(Debug, Deserialize)]
struct VerboseTranscript {
    #[serde(default)]
    segments: Option<Vec<VerboseSegment>>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

/// Speech-to-text over HTTP
#[derive(Debug, Clone)]
pub struct WhisperApiAdapter {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl WhisperApiAdapter {
    pub fn new(config: &TranscriptionConfig) -> Result<Self, TranscriptionServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| TranscriptionServiceError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/audio/transcriptions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TranscriptionServiceError::MissingApiKey)?;

        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscriptionServiceError::Request(format!("{}: {}", audio_path.display(), e)))?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionServiceError::Request(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", RESPONSE_FORMAT);

        debug!(endpoint = %self.endpoint, audio = %audio_path.display(), "Submitting transcription request");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionServiceError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Transcription service returned an error");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    TranscriptionServiceError::Auth { status: status.as_u16() }
                }
                StatusCode::TOO_MANY_REQUESTS => TranscriptionServiceError::Quota { body },
                _ => TranscriptionServiceError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| TranscriptionServiceError::Request(e.to_string()))?;
        parse_verbose_transcript(&body)
    }
}

/// Extract segments from a verbose transcript body; a missing list is empty
pub fn parse_verbose_transcript(body: &str) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
    let transcript: VerboseTranscript = serde_json::from_str(body)
        .map_err(|e| TranscriptionServiceError::MalformedResponse(e.to_string()))?;

    Ok(transcript
        .segments
        .unwrap_or_default()
        .into_iter()
        .map(|s| TranscriptSegment::new(s.start, s.end, s.text))
        .collect())
}

#[async_trait]
impl TranscriptionPort for WhisperApiAdapter {
    async fn transcribe(
        &self,
        audio_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
        tokio::select! {
            result = self.request(audio_path) => result,
            _ = cancel.cancelled() => Err(TranscriptionServiceError::Cancelled),
        }
    }
}
