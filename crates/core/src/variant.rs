//! Query variants — alternative phrasings produced by the planner.

use serde::{Deserialize, Serialize};

/// What kind of rewrite a variant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// The user's original phrasing. Always present as variant zero.
    Original,
    /// A semantically equivalent rephrasing.
    Rephrase,
    /// A sub-question split out of a multi-hop query.
    Decomposed,
}

/// One retrieval-ready phrasing of the query.
///
/// Variants are generated once per query and are immutable; their
/// insertion order is preserved through retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryVariant {
    /// The rewritten (or original) query text.
    pub text: String,

    /// How this variant was produced.
    pub kind: VariantKind,
}

impl QueryVariant {
    pub fn original(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: VariantKind::Original,
        }
    }

    pub fn rephrase(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: VariantKind::Rephrase,
        }
    }

    pub fn decomposed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: VariantKind::Decomposed,
        }
    }
}
