//! Context windows and the assembled context handed to synthesis.

use crate::hit::RetrievalPath;
use crate::kpi::KpiFact;
use serde::{Deserialize, Serialize};

/// One provenance entry: a sentence that contributed to a window, and
/// the path that surfaced it. Used later for citation validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub document_id: String,
    pub section_id: String,
    pub sentence_index: u32,
    pub path: RetrievalPath,
}

/// A sentence inside a window, by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSpan {
    /// Zero-based position within the section.
    pub index: u32,
    /// Sentence text (may be empty if the neighbor fetch failed).
    pub text: String,
}

/// An ordered, deduplicated run of sentences around one or more core
/// hits within a single document section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub document_id: String,
    pub section_id: String,
    pub fiscal_year: i32,

    /// Inclusive sentence range covered by this window.
    pub start: u32,
    pub end: u32,

    /// False when expansion was truncated by a section boundary.
    pub edge_safe: bool,

    /// Sentences in ascending position order.
    pub sentences: Vec<SentenceSpan>,

    /// Best (lowest) distance among the core hits in this window.
    pub best_distance: f32,

    /// Every contributing (document, section, sentence, path) tuple.
    pub provenance: Vec<Provenance>,
}

impl ContextWindow {
    /// Whether a sentence position falls inside this window's range.
    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index <= self.end
    }
}

/// How windows are ordered in the assembled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Best-distance first. Used for single-fact (KPI) questions.
    Relevance,
    /// Fiscal year ascending. Used for narrative/trend questions.
    Chronological,
}

/// The final evidence package passed to synthesis: semantic windows
/// plus structured KPI facts from the parallel supply line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    pub windows: Vec<ContextWindow>,
    pub kpi_facts: Vec<KpiFact>,
    pub ordering: OrderingMode,
}

impl AssembledContext {
    /// An empty context (no evidence at all).
    pub fn empty(ordering: OrderingMode) -> Self {
        Self {
            windows: Vec::new(),
            kpi_facts: Vec::new(),
            ordering,
        }
    }

    /// True when neither supply line produced evidence.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.kpi_facts.is_empty()
    }

    /// Whether a citation pointer exists in any window's provenance.
    pub fn has_provenance(&self, document_id: &str, section_id: &str, sentence_index: u32) -> bool {
        self.windows.iter().any(|w| {
            w.provenance.iter().any(|p| {
                p.document_id == document_id
                    && p.section_id == section_id
                    && p.sentence_index == sentence_index
            })
        })
    }
}
