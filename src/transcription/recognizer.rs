//! Speech recognition over short audio chunks.

use crate::error::{ClipquizError, Result};
use crate::openai::OpenAIClient;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Outcome of recognizing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Text(String),
    /// The service worked but found no intelligible speech.
    Unrecognized,
}

/// A speech recognition engine.
///
/// `Err` is reserved for service-level failures; a chunk without speech is
/// [`Recognition::Unrecognized`].
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, chunk: &Path) -> Result<Recognition>;
}

/// Recognizer backed by an OpenAI-compatible audio transcription endpoint.
pub struct WhisperRecognizer {
    client: OpenAIClient,
    model: String,
    language: String,
    timeout: Duration,
}

impl WhisperRecognizer {
    pub fn new(client: OpenAIClient, model: &str, language: &str, timeout: Duration) -> Self {
        Self {
            client,
            model: model.to_string(),
            language: language.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    #[instrument(skip(self), fields(chunk = %chunk.display()))]
    async fn recognize(&self, chunk: &Path) -> Result<Recognition> {
        let file_bytes = tokio::fs::read(chunk).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                chunk
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("chunk.wav")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .language(&self.language)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| ClipquizError::OpenAI(format!("Failed to build request: {}", e)))?;

        let response = tokio::time::timeout(self.timeout, self.client.audio().transcribe(request))
            .await
            .map_err(|_| ClipquizError::Timeout {
                operation: "speech recognition".to_string(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| ClipquizError::OpenAI(format!("Transcription API error: {}", e)))?;

        let text = response.text.trim();
        debug!("Recognized {} characters", text.len());

        if text.is_empty() {
            Ok(Recognition::Unrecognized)
        } else {
            Ok(Recognition::Text(text.to_string()))
        }
    }
}
