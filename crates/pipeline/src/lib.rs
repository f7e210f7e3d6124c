//! End-to-end question answering.
//!
//! [`QueryPipeline`] wires the stages together: resolve → plan →
//! (retrieve ∥ KPI lookup) → assemble → synthesize → validate. Each
//! question produces exactly one [`finsight_core::QueryResponse`],
//! whatever failed along the way.

pub mod pipeline;
pub mod prompt;

pub use pipeline::{PipelineBuilder, PipelineConfig, PipelineServices, QueryPipeline};
