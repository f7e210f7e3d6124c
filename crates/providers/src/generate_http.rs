//! OpenAI-compatible generation client.
//!
//! Works with any service exposing a `/chat/completions` endpoint:
//! OpenAI, OpenRouter, vLLM, Ollama and friends.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use finsight_core::{GenerationRequest, GenerationResponse, Generator, ServiceError, TokenUsage};

use crate::http::{build_client, check_status, network};

/// A generation service speaking the OpenAI chat-completions shape.
pub struct HttpGenerator {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(timeout)?,
        })
    }
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ServiceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        });

        debug!(model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let response = check_status(response).await?;

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(format!("completion response: {e}")))?;

        let choice = api
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Malformed("no choices in response".into()))?;

        Ok(GenerationResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: api.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    async fn health_check(&self) -> Result<bool, ServiceError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(network)?;
        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
