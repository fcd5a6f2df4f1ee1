//! Reply generation via an OpenAI-compatible chat completions API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ResponseGenerator;
use crate::config::LlmConfig;
use crate::{Error, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Generates replies through a chat completions endpoint
pub struct ChatCompletions {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatCompletions {
    /// Create a generator from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build LLM client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ResponseGenerator for ChatCompletions {
    async fn generate(&self, text: &str) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: text,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(model = %self.config.model, "requesting reply");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Generate(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generate(format!("LLM API error {status}: {body}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generate(format!("failed to parse LLM response: {e}")))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generate("LLM response contained no choices".to_string()))?;

        tracing::info!(reply = %reply.trim(), "reply generated");
        Ok(reply)
    }
}
