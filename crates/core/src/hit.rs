//! Retrieval hits — sentence-level candidates from the vector index.
//!
//! A hit is a value object. Its identity for deduplication is the
//! (document, section, sentence-index) triple; when the same unit comes
//! back from several paths or variants, fusion keeps one hit with the
//! minimum distance and the union of contributing paths and variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which retrieval strategy produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPath {
    /// Vector query constrained by a metadata filter (entity, years).
    Filtered,
    /// The same vector query with no metadata filter.
    Global,
    /// Neighbor sentences fetched around a core hit; never a fresh
    /// vector query.
    WindowExpansion,
}

impl RetrievalPath {
    /// Tie-break priority for ranking. Lower wins: a filtered hit
    /// outranks a global hit at equal distance, and a hit that only
    /// ever appeared as a neighbor never outranks a direct hit.
    pub fn priority(self) -> u8 {
        match self {
            Self::Filtered => 0,
            Self::Global => 1,
            Self::WindowExpansion => 2,
        }
    }
}

impl std::fmt::Display for RetrievalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filtered => write!(f, "filtered"),
            Self::Global => write!(f, "global"),
            Self::WindowExpansion => write!(f, "window-expansion"),
        }
    }
}

/// Deduplication identity of a sentence-level unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitKey {
    /// Source document identifier.
    pub document_id: String,
    /// Section identifier within the document.
    pub section_id: String,
    /// Zero-based sentence position within the section.
    pub sentence_index: u32,
}

impl std::fmt::Display for HitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.document_id, self.section_id, self.sentence_index
        )
    }
}

/// A single fused retrieval candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Dedup identity.
    pub key: HitKey,

    /// Fiscal year of the source filing.
    pub fiscal_year: i32,

    /// Total sentence count of the source section (window clamping bound).
    pub section_len: u32,

    /// Best (lowest) similarity distance observed across all
    /// contributing calls. Lower = closer.
    pub distance: f32,

    /// Sentence text. May be empty for hits whose text has not been
    /// fetched yet.
    pub text: String,

    /// Every path that returned this unit.
    pub paths: BTreeSet<RetrievalPath>,

    /// Indices of the variants that returned this unit.
    pub variants: BTreeSet<usize>,
}

impl RetrievalHit {
    /// Whether this unit was returned by a fresh vector query, as
    /// opposed to appearing only as a window-expansion neighbor.
    pub fn is_direct(&self) -> bool {
        self.paths
            .iter()
            .any(|p| *p != RetrievalPath::WindowExpansion)
    }

    /// Best path priority among contributing paths (for tie-breaks).
    pub fn best_path_priority(&self) -> u8 {
        self.paths
            .iter()
            .map(|p| p.priority())
            .min()
            .unwrap_or(u8::MAX)
    }
}
