//! HTTP vector search client.
//!
//! Speaks a plain JSON query API: `POST /query` with the embedding,
//! candidate budget and optional metadata filter, answered by an
//! ordered match list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use finsight_core::{ServiceError, VectorMatch, VectorQuery, VectorSearch};

use crate::http::{build_client, check_status, network};

/// A remote vector index.
pub struct HttpVectorSearch {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpVectorSearch {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(timeout)?,
        })
    }
}

impl std::fmt::Debug for HttpVectorSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVectorSearch")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

#[async_trait]
impl VectorSearch for HttpVectorSearch {
    async fn query(&self, request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
        let url = format!("{}/query", self.base_url);

        let body = QueryBody {
            vector: request.embedding,
            top_k: request.top_k,
            filter: request.filter.as_ref().map(|f| FilterBody {
                ciks: f.ciks.clone(),
                year_range: f.year_range,
            }),
        };

        debug!(top_k = body.top_k, filtered = body.filter.is_some(), "vector query");

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

        let api: QueryApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(format!("vector query response: {e}")))?;

        Ok(api.matches)
    }

    async fn health_check(&self) -> Result<bool, ServiceError> {
        let url = format!("{}/health", self.base_url);
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

#[derive(Debug, Serialize)]
struct QueryBody {
    vector: Vec<f32>,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterBody>,
}

#[derive(Debug, Serialize)]
struct FilterBody {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ciks: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_range: Option<(i32, i32)>,
}

#[derive(Debug, Deserialize)]
struct QueryApiResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}
