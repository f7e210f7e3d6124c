//! Synthesis output and the grounding verdict.

use serde::{Deserialize, Serialize};

/// A citation claimed by the synthesized answer, pointing into the
/// assembled context's provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub section_id: String,
    pub sentence_index: u32,
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}|{}|{}]",
            self.document_id, self.section_id, self.sentence_index
        )
    }
}

/// The generated answer plus the citations parsed out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Answer text with citation markers still in place.
    pub answer: String,

    /// Citations claimed by the answer, in order of appearance.
    pub citations: Vec<Citation>,
}

/// The verdict for one factual claim in the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCheck {
    /// The claim sentence (markers stripped).
    pub claim: String,

    /// Whether the claim is backed by provenance, text overlap, or a
    /// structured KPI fact.
    pub supported: bool,

    /// Why the claim passed or failed.
    pub reason: String,
}

/// Per-claim results plus the overall grounded flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingVerdict {
    /// True only when every claim is supported and every citation
    /// resolves into provenance.
    pub grounded: bool,

    /// Individual claim verdicts.
    pub claims: Vec<ClaimCheck>,
}

impl GroundingVerdict {
    /// A verdict with no claims, used for terminal responses that never
    /// reached synthesis.
    pub fn ungrounded() -> Self {
        Self {
            grounded: false,
            claims: Vec::new(),
        }
    }

    /// Number of failing claims.
    pub fn failures(&self) -> usize {
        self.claims.iter().filter(|c| !c.supported).count()
    }
}
