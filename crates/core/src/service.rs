//! Traits for the external collaborators the core consumes.
//!
//! Every unreliable, latency-variable dependency sits behind one of
//! these seams: the vector index, the embedding service, the language
//! generator, the sentence metadata store, and the structured KPI
//! table. Implementations live in `finsight-providers`; tests use
//! scripted mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::kpi::KpiFact;

// ── Vector search ─────────────────────────────────────────────────────────

/// Metadata constraint for the filtered retrieval path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    /// Restrict to these company identifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ciks: Vec<u64>,

    /// Inclusive fiscal-year range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<(i32, i32)>,
}

impl MetadataFilter {
    pub fn is_empty(&self) -> bool {
        self.ciks.is_empty() && self.year_range.is_none()
    }
}

/// One vector query against the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorQuery {
    /// The query embedding.
    pub embedding: Vec<f32>,

    /// Maximum candidates to return. Callers must respect the service
    /// ceiling; implementations may clamp further.
    pub top_k: usize,

    /// Optional metadata constraint (None = global path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<MetadataFilter>,
}

/// One candidate returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub document_id: String,
    pub section_id: String,
    pub sentence_index: u32,
    pub fiscal_year: i32,

    /// Total sentence count of the section (for window clamping).
    pub section_len: u32,

    /// Similarity distance; lower = closer.
    pub distance: f32,

    /// The sentence text.
    pub text: String,
}

/// The vector search service.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Run one similarity query. Must return an ordered candidate list;
    /// an empty list is a valid response, not an error.
    async fn query(&self, request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError>;

    /// Health check — can we reach the index?
    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}

// ── Embedding ─────────────────────────────────────────────────────────────

/// The embedding service: text → fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;

    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}

// ── Language generation ───────────────────────────────────────────────────

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System-level instruction.
    pub system: String,

    /// The user prompt.
    pub prompt: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// Token usage reported by the generation service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// The language-generation service, used for variant generation and
/// answer synthesis. Callers must tolerate truncated or malformed
/// output.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ServiceError>;

    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}

// ── Sentence metadata store ───────────────────────────────────────────────

/// One sentence row from the metadata table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub document_id: String,
    pub section_id: String,
    pub sentence_index: u32,
    pub fiscal_year: i32,
    pub section_len: u32,
    pub text: String,
}

/// The sentence metadata store, used by the window-expansion path to
/// fetch neighbors of a core hit. Not a vector query.
#[async_trait]
pub trait SentenceStore: Send + Sync {
    /// Fetch sentences of one document section in the inclusive
    /// position range [start, end]. Callers clamp the range to section
    /// bounds before calling.
    async fn fetch_range(
        &self,
        document_id: &str,
        section_id: &str,
        start: u32,
        end: u32,
    ) -> Result<Vec<SentenceRecord>, ServiceError>;

    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}

// ── KPI fact store ────────────────────────────────────────────────────────

/// The structured metric table, keyed by (entity, year, metric).
#[async_trait]
pub trait KpiStore: Send + Sync {
    /// Look up one fact. `None` means the table has no value for the
    /// key — a normal outcome, not an error.
    async fn lookup(
        &self,
        cik: u64,
        fiscal_year: i32,
        metric: &str,
    ) -> Result<Option<KpiFact>, ServiceError>;

    async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }
}
