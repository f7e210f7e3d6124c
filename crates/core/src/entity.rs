//! Resolved entities and structured year hints.

use serde::{Deserialize, Serialize};

/// How an entity mention was matched against the company table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Exact ticker or CIK-literal match.
    Exact,
    /// Exact alias-token match ("apple" → Apple Inc.).
    Alias,
    /// Levenshtein-similarity match above the acceptance threshold.
    Fuzzy,
}

/// A company mention resolved to its canonical identifier.
///
/// A query may resolve to zero, one, or several entities; zero matches
/// is a valid terminal state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// Canonical numeric key (SEC CIK).
    pub cik: u64,

    /// Canonical company name.
    pub name: String,

    /// Match confidence in [0, 1].
    pub confidence: f32,

    /// Which matching tier produced this entity.
    pub method: MatchMethod,
}

/// Fiscal years mentioned in the query, with ranges already expanded.
///
/// Years are structured hints attached to the query, never entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearHints {
    /// All distinct valid years, sorted ascending.
    pub years: Vec<i32>,

    /// Set when the query mentions the current or a future year, for
    /// which filings may not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl YearHints {
    /// Inclusive (min, max) range, if any years were found.
    pub fn range(&self) -> Option<(i32, i32)> {
        match (self.years.first(), self.years.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
