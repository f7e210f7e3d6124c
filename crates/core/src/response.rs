//! The response contract exposed to the presentation layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::synthesis::{Citation, GroundingVerdict};

/// Which retrieval behaviors actually occurred for this question.
/// Degradations are recorded here, never silently hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFlags {
    /// At least one filtered-path hit survived fusion.
    pub filtered_used: bool,

    /// The filtered path failed or returned nothing and the answer
    /// relies on the global path alone.
    pub fallback_used: bool,

    /// At least one call was cut off by a timeout or the per-question
    /// deadline; partial results were used.
    pub partial_timeout: bool,

    /// Number of individual path calls that errored or timed out.
    pub paths_failed: u32,
}

/// How the question terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutcome {
    /// A grounded answer was produced.
    Answered,
    /// No supporting evidence was found; synthesis was never invoked.
    NoEvidence,
    /// Claims remained unsupported after the retry ceiling.
    LowConfidence,
}

/// Latency and cost metadata for one question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Wall-clock latency for the whole question, in milliseconds.
    pub latency_ms: u64,

    /// Number of language-generation calls made.
    pub llm_calls: u32,

    /// Number of vector queries issued.
    pub vector_queries: u32,

    /// Total LLM tokens consumed (input + output).
    pub total_tokens: u32,

    /// Estimated cost in USD.
    pub cost_usd: f64,
}

/// The full answer package returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Id of the question this answers.
    pub question_id: Uuid,

    /// The answer text. For `NoEvidence` and `LowConfidence` outcomes
    /// this is an explicit explanation, never unverified content.
    pub answer: String,

    /// Citations, each resolvable to (document, section, sentence).
    pub citations: Vec<Citation>,

    /// Per-claim grounding verdict.
    pub verdict: GroundingVerdict,

    /// Terminal state of the question.
    pub outcome: ResponseOutcome,

    /// Retrieval-path usage and degradation flags.
    pub flags: RetrievalFlags,

    /// Latency and cost metadata.
    pub trace: TraceSummary,
}

impl QueryResponse {
    /// Build the terminal "no supporting evidence" response.
    pub fn no_evidence(question_id: Uuid, flags: RetrievalFlags, trace: TraceSummary) -> Self {
        Self {
            question_id,
            answer: "No supporting evidence was found for this question in the indexed filings \
                     or the structured metric table."
                .into(),
            citations: Vec::new(),
            verdict: GroundingVerdict::ungrounded(),
            outcome: ResponseOutcome::NoEvidence,
            flags,
            trace,
        }
    }

    /// Build the terminal low-confidence response after the retry
    /// ceiling is exhausted.
    pub fn low_confidence(
        question_id: Uuid,
        verdict: GroundingVerdict,
        flags: RetrievalFlags,
        trace: TraceSummary,
    ) -> Self {
        Self {
            question_id,
            answer: "The generated answer could not be verified against the retrieved evidence. \
                     No reliable answer is available for this question."
                .into(),
            citations: Vec::new(),
            verdict,
            outcome: ResponseOutcome::LowConfidence,
            flags,
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_evidence_response_has_zero_citations() {
        let r = QueryResponse::no_evidence(
            Uuid::new_v4(),
            RetrievalFlags::default(),
            TraceSummary::default(),
        );
        assert!(r.citations.is_empty());
        assert!(!r.verdict.grounded);
        assert_eq!(r.outcome, ResponseOutcome::NoEvidence);
    }

    #[test]
    fn low_confidence_drops_citations() {
        let r = QueryResponse::low_confidence(
            Uuid::new_v4(),
            GroundingVerdict::ungrounded(),
            RetrievalFlags {
                fallback_used: true,
                ..Default::default()
            },
            TraceSummary::default(),
        );
        assert_eq!(r.outcome, ResponseOutcome::LowConfidence);
        assert!(r.citations.is_empty());
        assert!(r.flags.fallback_used);
    }
}
