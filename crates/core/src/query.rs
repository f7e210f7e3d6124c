//! The user question and its classification.
//!
//! A `Query` is immutable once created; the planner attaches a
//! classification by producing a new value, never by mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of query classifications.
///
/// Classification drives variant generation and context ordering:
/// - `Kpi` — single structured-fact questions ("What was revenue in 2023?")
/// - `Narrative` — qualitative/discussion questions (the default arm)
/// - `MultiHop` — comparisons or questions needing decomposition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Kpi,
    #[default]
    Narrative,
    MultiHop,
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kpi => write!(f, "kpi"),
            Self::Narrative => write!(f, "narrative"),
            Self::MultiHop => write!(f, "multi-hop"),
        }
    }
}

/// A single user question entering the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Unique id for this question (used in traces and logs).
    pub id: Uuid,

    /// The raw question text.
    pub text: String,

    /// Explicit company hints supplied by the caller (tickers or names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_hints: Vec<String>,

    /// Explicit fiscal-year hints supplied by the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub year_hints: Vec<i32>,

    /// Pre-classified type, if the caller already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
}

impl Query {
    /// Create a query from raw text with no hints.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            entity_hints: Vec::new(),
            year_hints: Vec::new(),
            query_type: None,
        }
    }

    /// Attach explicit entity hints.
    pub fn with_entity_hints(mut self, hints: Vec<String>) -> Self {
        self.entity_hints = hints;
        self
    }

    /// Attach explicit year hints.
    pub fn with_year_hints(mut self, years: Vec<i32>) -> Self {
        self.year_hints = years;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_type_is_narrative() {
        assert_eq!(QueryType::default(), QueryType::Narrative);
    }

    #[test]
    fn query_builder() {
        let q = Query::new("What was NVDA revenue in 2021?")
            .with_entity_hints(vec!["NVDA".into()])
            .with_year_hints(vec![2021]);
        assert_eq!(q.entity_hints, vec!["NVDA".to_string()]);
        assert_eq!(q.year_hints, vec![2021]);
        assert!(q.query_type.is_none());
    }

    #[test]
    fn query_type_display() {
        assert_eq!(QueryType::MultiHop.to_string(), "multi-hop");
        assert_eq!(QueryType::Kpi.to_string(), "kpi");
    }
}
