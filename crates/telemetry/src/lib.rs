//! Per-question tracing and cost estimation.
//!
//! The pipeline records a [`Span`] for every stage and generation call,
//! collects them into a [`QuestionTrace`], and collapses the trace into
//! the `TraceSummary` carried on every response.

pub mod model;
pub mod pricing;

pub use model::{QuestionTrace, Span, SpanKind};
pub use pricing::{ModelPricing, PricingTable};
