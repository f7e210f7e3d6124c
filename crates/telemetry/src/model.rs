//! Data model for per-question execution traces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use finsight_core::TraceSummary;

/// The kind of work a span represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// A vector index query.
    VectorQuery,
    /// A language-generation call.
    Generation,
    /// One pipeline stage (resolve, plan, retrieve, ...).
    Stage,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VectorQuery => write!(f, "vector_query"),
            Self::Generation => write!(f, "generation"),
            Self::Stage => write!(f, "stage"),
        }
    }
}

/// A single traced execution unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique identifier.
    pub id: String,
    /// What kind of work this represents.
    pub kind: SpanKind,
    /// Human-readable label (stage name, model name).
    pub label: String,
    /// When the span started.
    pub started_at: DateTime<Utc>,
    /// When the span ended (None if still running).
    pub ended_at: Option<DateTime<Utc>>,
    /// Duration in milliseconds (computed on end).
    pub duration_ms: Option<u64>,
    /// Input tokens consumed (generation calls).
    pub input_tokens: Option<u32>,
    /// Output tokens produced (generation calls).
    pub output_tokens: Option<u32>,
    /// Estimated cost in USD.
    pub cost_usd: Option<f64>,
    /// Whether the operation succeeded.
    pub success: Option<bool>,
}

impl Span {
    pub fn new(kind: SpanKind, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            input_tokens: None,
            output_tokens: None,
            cost_usd: None,
            success: None,
        }
    }

    /// Mark the span as ended with the given success status.
    pub fn end(&mut self, success: bool) {
        let now = Utc::now();
        self.ended_at = Some(now);
        self.duration_ms = Some(
            now.signed_duration_since(self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        self.success = Some(success);
    }

    /// Record token usage and its estimated cost.
    pub fn record_tokens(&mut self, input: u32, output: u32, cost: f64) {
        self.input_tokens = Some(input);
        self.output_tokens = Some(output);
        self.cost_usd = Some(cost);
    }

    /// Total tokens (input + output), or 0 if not recorded.
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }
}

/// All spans recorded while answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTrace {
    /// The question this trace belongs to.
    pub question_id: Uuid,
    /// All spans, in recording order.
    pub spans: Vec<Span>,
    /// When the question started.
    pub started_at: DateTime<Utc>,
    /// When the question finished.
    pub ended_at: Option<DateTime<Utc>>,
}

impl QuestionTrace {
    pub fn new(question_id: Uuid) -> Self {
        Self {
            question_id,
            spans: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn add_span(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn end(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn total_cost(&self) -> f64 {
        self.spans.iter().filter_map(|s| s.cost_usd).sum()
    }

    pub fn total_tokens(&self) -> u32 {
        self.spans.iter().map(|s| s.total_tokens()).sum()
    }

    pub fn generation_count(&self) -> u32 {
        self.spans
            .iter()
            .filter(|s| s.kind == SpanKind::Generation)
            .count() as u32
    }

    pub fn vector_query_count(&self) -> u32 {
        self.spans
            .iter()
            .filter(|s| s.kind == SpanKind::VectorQuery)
            .count() as u32
    }

    /// Collapse the trace into the summary carried on the response.
    pub fn summarize(&self) -> TraceSummary {
        let latency_ms = self
            .ended_at
            .unwrap_or_else(Utc::now)
            .signed_duration_since(self.started_at)
            .num_milliseconds()
            .max(0) as u64;

        TraceSummary {
            latency_ms,
            llm_calls: self.generation_count(),
            vector_queries: self.vector_query_count(),
            total_tokens: self.total_tokens(),
            cost_usd: self.total_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_lifecycle() {
        let mut span = Span::new(SpanKind::Generation, "gpt-4o-mini");
        assert!(span.ended_at.is_none());
        assert_eq!(span.total_tokens(), 0);

        span.record_tokens(100, 50, 0.003);
        assert_eq!(span.total_tokens(), 150);

        span.end(true);
        assert!(span.ended_at.is_some());
        assert!(span.success.unwrap());
        assert!(span.duration_ms.is_some());
    }

    #[test]
    fn trace_aggregation() {
        let mut trace = QuestionTrace::new(Uuid::new_v4());

        let mut s1 = Span::new(SpanKind::Generation, "synthesis");
        s1.record_tokens(1000, 200, 0.004);
        s1.end(true);
        trace.add_span(s1);

        let mut s2 = Span::new(SpanKind::VectorQuery, "global");
        s2.end(true);
        trace.add_span(s2);

        let mut s3 = Span::new(SpanKind::VectorQuery, "filtered");
        s3.end(true);
        trace.add_span(s3);

        trace.end();
        let summary = trace.summarize();

        assert_eq!(summary.llm_calls, 1);
        assert_eq!(summary.vector_queries, 2);
        assert_eq!(summary.total_tokens, 1200);
        assert!((summary.cost_usd - 0.004).abs() < 1e-10);
    }

    #[test]
    fn span_kind_display() {
        assert_eq!(SpanKind::VectorQuery.to_string(), "vector_query");
        assert_eq!(SpanKind::Generation.to_string(), "generation");
        assert_eq!(SpanKind::Stage.to_string(), "stage");
    }

    #[test]
    fn trace_serialization_roundtrip() {
        let mut trace = QuestionTrace::new(Uuid::new_v4());
        let mut s = Span::new(SpanKind::Stage, "retrieve");
        s.end(true);
        trace.add_span(s);
        trace.end();

        let json = serde_json::to_string(&trace).unwrap();
        let roundtrip: QuestionTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.spans.len(), 1);
        assert_eq!(roundtrip.spans[0].label, "retrieve");
    }
}
