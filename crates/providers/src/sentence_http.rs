//! HTTP sentence metadata client.
//!
//! Fetches contiguous sentence runs from the sentence table service,
//! used only by window expansion. This is a keyed range read, never a
//! vector query.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use finsight_core::{SentenceRecord, SentenceStore, ServiceError};

use crate::http::{build_client, check_status, network};

/// A remote sentence metadata table.
pub struct HttpSentenceStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpSentenceStore {
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

impl std::fmt::Debug for HttpSentenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSentenceStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

#[async_trait]
impl SentenceStore for HttpSentenceStore {
    async fn fetch_range(
        &self,
        document_id: &str,
        section_id: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<SentenceRecord>, ServiceError> {
        let url = format!("{}/sentences", self.base_url);

        debug!(document_id, section_id, start, end, "sentence range fetch");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("document_id", document_id),
                ("section_id", section_id),
                ("start", &start.to_string()),
                ("end", &end.to_string()),
            ])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(network)?;
        let response = check_status(response).await?;

        let api: SentenceApiResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(format!("sentence response: {e}")))?;

        Ok(api.sentences)
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

#[derive(Debug, Deserialize)]
struct SentenceApiResponse {
    #[serde(default)]
    sentences: Vec<SentenceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sentence_rows() {
        let data = r#"{
            "sentences": [{
                "document_id": "d",
                "section_id": "7",
                "sentence_index": 9,
                "fiscal_year": 2020,
                "section_len": 40,
                "text": "Margins expanded."
            }]
        }"#;
        let parsed: SentenceApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.sentences[0].sentence_index, 9);
    }
}
