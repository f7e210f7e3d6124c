//! FinSight core — domain types and service traits.
//!
//! This crate defines the shared vocabulary of the query-time hybrid
//! retrieval and grounding orchestrator:
//!
//! - **Queries and plans**: [`Query`], [`QueryType`], [`QueryVariant`]
//! - **Entities**: [`ResolvedEntity`], [`YearHints`]
//! - **Retrieval**: [`RetrievalHit`], [`HitKey`], [`RetrievalPath`]
//! - **Context**: [`ContextWindow`], [`AssembledContext`], [`Provenance`]
//! - **Synthesis & grounding**: [`SynthesisResult`], [`Citation`],
//!   [`GroundingVerdict`]
//! - **External seams**: the [`service`] traits for the vector index,
//!   embedding service, language generator, sentence store, and KPI
//!   table
//! - **Response contract**: [`QueryResponse`] and [`RetrievalFlags`]
//!
//! Every value is created fresh per question and never mutated after
//! construction; stages communicate by returning new values.

pub mod entity;
pub mod error;
pub mod hit;
pub mod kpi;
pub mod query;
pub mod response;
pub mod service;
pub mod synthesis;
pub mod variant;
pub mod window;

pub use entity::{MatchMethod, ResolvedEntity, YearHints};
pub use error::{Error, Result, RetrievalError, ServiceError};
pub use hit::{HitKey, RetrievalHit, RetrievalPath};
pub use kpi::KpiFact;
pub use query::{Query, QueryType};
pub use response::{QueryResponse, ResponseOutcome, RetrievalFlags, TraceSummary};
pub use service::{
    Embedder, GenerationRequest, GenerationResponse, Generator, KpiStore, MetadataFilter,
    SentenceRecord, SentenceStore, TokenUsage, VectorMatch, VectorQuery, VectorSearch,
};
pub use synthesis::{Citation, ClaimCheck, GroundingVerdict, SynthesisResult};
pub use variant::{QueryVariant, VariantKind};
pub use window::{AssembledContext, ContextWindow, OrderingMode, Provenance, SentenceSpan};
