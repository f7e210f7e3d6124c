//! OpenAI-compatible embedding client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use finsight_core::{Embedder, ServiceError};

use crate::http::{build_client, check_status, network};

/// An embedding service speaking the OpenAI `/embeddings` shape.
pub struct HttpEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpEmbedder {
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

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
            "encoding_format": "float",
        });

        debug!(model = %self.model, chars = text.len(), "sending embedding request");

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

        let api: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(format!("embedding response: {e}")))?;

        api.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ServiceError::Malformed("no embedding in response".into()))
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
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_embedding_response() {
        let data = r#"{
            "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}],
            "model": "text-embedding-3-small"
        }"#;
        let parsed: EmbeddingApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn debug_redacts_api_key() {
        let e = HttpEmbedder::new(
            "http://localhost:8080",
            "sk-secret",
            "text-embedding-3-small",
            Duration::from_secs(10),
        )
        .unwrap();
        assert!(!format!("{e:?}").contains("sk-secret"));
    }
}
