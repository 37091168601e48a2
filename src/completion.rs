//! Text-completion service abstraction.

use crate::config::SamplingSettings;
use crate::error::{ClipquizError, Result};
use crate::openai::OpenAIClient;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// A service that completes a single prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `prompt` with the given sampling parameters and return the raw text.
    async fn complete(&self, prompt: &str, sampling: SamplingSettings) -> Result<String>;
}

/// Chat completion against an OpenAI-compatible endpoint. The prompt is sent
/// as a single system message.
pub struct ChatCompletion {
    client: OpenAIClient,
    model: String,
}

impl ChatCompletion {
    pub fn new(client: OpenAIClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl CompletionService for ChatCompletion {
    #[instrument(skip(self, prompt), fields(model = %self.model, max_tokens = sampling.max_tokens))]
    async fn complete(&self, prompt: &str, sampling: SamplingSettings) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| ClipquizError::OpenAI(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(sampling.max_tokens)
            .temperature(sampling.temperature)
            .build()
            .map_err(|e| ClipquizError::OpenAI(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            ClipquizError::OpenAI(format!("Failed to get completion: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ClipquizError::OpenAI("Empty response from LLM".to_string()))?
            .clone();

        debug!("Completion: {}", content.chars().take(200).collect::<String>());
        Ok(content)
    }
}
