//! OpenAI chat-based synthesizer.

use super::Synthesizer;
use crate::error::{Result, VitenError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-based synthesizer.
pub struct OpenAISynthesizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAISynthesizer {
    /// Create a synthesizer for the given model.
    pub fn new(model: &str) -> Self {
        Self::with_timeout(model, Duration::from_secs(300))
    }

    /// Create a synthesizer with a custom request timeout.
    pub fn with_timeout(model: &str, timeout: Duration) -> Self {
        Self {
            client: create_client_with_timeout(timeout),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Synthesizer for OpenAISynthesizer {
    #[instrument(skip(self, system_prompt, user_prompt))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if !system_prompt.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt.to_string())
                    .build()
                    .map_err(|e| VitenError::Provider(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt.to_string())
                .build()
                .map_err(|e| VitenError::Provider(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| VitenError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VitenError::Provider(format!("Synthesis API error: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| VitenError::Provider("Empty response from LLM".to_string()))?
            .trim()
            .to_string();

        debug!("Synthesized {} characters", text.len());
        Ok(text)
    }
}
