//! Rule-based query-type classification.
//!
//! Cheap and deterministic; runs before any LLM call. The default arm
//! is `Narrative` because free-form filing questions dominate.

use finsight_core::QueryType;

/// Phrasings that signal a cross-entity or cross-period comparison.
const COMPARISON_MARKERS: &[&str] = &[
    "compare",
    "comparison",
    "versus",
    " vs ",
    " vs. ",
    "difference between",
    "relative to",
];

/// Classify one question.
///
/// `entity_count` is the number of companies resolved from the text,
/// `has_metric` whether the metric catalog matched a canonical metric,
/// `has_year` whether a concrete fiscal year was extracted.
pub fn classify(text: &str, entity_count: usize, has_metric: bool, has_year: bool) -> QueryType {
    let lowered = text.to_lowercase();

    if entity_count > 1 || COMPARISON_MARKERS.iter().any(|m| lowered.contains(m)) {
        return QueryType::MultiHop;
    }

    // A metric word plus a concrete year is answerable from the
    // structured table.
    if has_metric && has_year {
        return QueryType::Kpi;
    }

    QueryType::Narrative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_plus_year_is_kpi() {
        let t = classify("What was NVIDIA's revenue in 2020?", 1, true, true);
        assert_eq!(t, QueryType::Kpi);
    }

    #[test]
    fn metric_without_year_is_narrative() {
        let t = classify("How has NVIDIA's revenue trended?", 1, true, false);
        assert_eq!(t, QueryType::Narrative);
    }

    #[test]
    fn comparison_phrase_is_multi_hop() {
        let t = classify("Compare gross margin across 2019 and 2020", 1, true, true);
        assert_eq!(t, QueryType::MultiHop);
    }

    #[test]
    fn two_entities_is_multi_hop() {
        let t = classify("Apple and Microsoft supply chain risks", 2, false, false);
        assert_eq!(t, QueryType::MultiHop);
    }

    #[test]
    fn vs_needs_word_boundaries() {
        // "vs" inside a word must not trigger the comparison rule.
        let t = classify("What does the investor letter say?", 1, false, false);
        assert_eq!(t, QueryType::Narrative);
    }

    #[test]
    fn default_is_narrative() {
        let t = classify("Describe the risk factors disclosed", 0, false, false);
        assert_eq!(t, QueryType::Narrative);
    }
}
