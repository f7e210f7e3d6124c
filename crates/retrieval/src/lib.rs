//! Multi-path evidence retrieval.
//!
//! For every query variant the orchestrator runs a metadata-filtered
//! vector query (when entities resolved) and an unfiltered global
//! query, all concurrently under per-call timeouts clipped to the
//! question deadline. Results are fused by sentence identity, floored
//! by quality, ranked, and expanded with neighbor sentences around the
//! best direct hits.

pub mod fusion;
pub mod orchestrator;

pub use fusion::Contribution;
pub use orchestrator::{RetrievalConfig, RetrievalOrchestrator, RetrievalOutcome};
