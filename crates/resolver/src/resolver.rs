//! Tiered company resolution.
//!
//! Tier 1 is exact: ticker symbols, alias tokens, and literal CIK
//! digits. Tier 2 is fuzzy and runs only when tier 1 found nothing,
//! so a clean ticker mention never pays the fuzzy scan. Every result
//! carries a confidence score and the method that produced it.

use tracing::debug;

use finsight_core::{MatchMethod, ResolvedEntity};

use crate::alias::AliasTable;
use crate::fuzzy;

/// Minimum token length considered by the fuzzy tier. Short tokens
/// produce too many near-collisions to score reliably.
const FUZZY_MIN_LEN: usize = 4;

/// Resolves company mentions in question text against the alias table.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    table: AliasTable,
    fuzzy_threshold: f32,
}

impl EntityResolver {
    pub fn new(table: AliasTable) -> Self {
        Self {
            table,
            fuzzy_threshold: 0.85,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Resolve all company mentions in `text`. Deterministic: results
    /// are sorted by confidence descending, then CIK ascending, and
    /// deduplicated by CIK keeping the best match.
    pub fn resolve(&self, text: &str) -> Vec<ResolvedEntity> {
        let mut entities = self.resolve_exact(text);

        if entities.is_empty() {
            entities = self.resolve_fuzzy(text);
            if !entities.is_empty() {
                debug!(count = entities.len(), "fuzzy tier produced matches");
            }
        }

        entities.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.cik.cmp(&b.cik))
        });
        entities.dedup_by_key(|e| e.cik);
        entities
    }

    fn resolve_exact(&self, text: &str) -> Vec<ResolvedEntity> {
        let mut out = Vec::new();

        for raw in text.split_whitespace() {
            // Ticker form: 1-5 uppercase letters in the original text,
            // stripped of surrounding punctuation.
            let stripped: &str = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if looks_like_ticker(stripped)
                && let Some(company) = self.table.by_ticker(stripped)
            {
                out.push(ResolvedEntity {
                    cik: company.cik,
                    name: company.name.clone(),
                    confidence: 1.0,
                    method: MatchMethod::Exact,
                });
                continue;
            }

            // Literal CIK digits (5-10 of them).
            if stripped.len() >= 5
                && stripped.len() <= 10
                && stripped.bytes().all(|b| b.is_ascii_digit())
                && let Ok(cik) = stripped.parse::<u64>()
                && let Some(company) = self.table.by_cik(cik)
            {
                out.push(ResolvedEntity {
                    cik: company.cik,
                    name: company.name.clone(),
                    confidence: 1.0,
                    method: MatchMethod::Exact,
                });
            }
        }

        // Alias tokens over the lowercased, punctuation-split text.
        for token in alias_tokens(text) {
            for company in self.table.by_alias(&token) {
                out.push(ResolvedEntity {
                    cik: company.cik,
                    name: company.name.clone(),
                    confidence: 0.95,
                    method: MatchMethod::Alias,
                });
            }
        }

        out
    }

    fn resolve_fuzzy(&self, text: &str) -> Vec<ResolvedEntity> {
        let choices: Vec<&str> = self.table.alias_tokens().collect();
        let mut out = Vec::new();

        for token in alias_tokens(text) {
            if token.len() < FUZZY_MIN_LEN {
                continue;
            }
            if let Some((alias, score)) = fuzzy::best_match(&token, choices.iter().copied(), self.fuzzy_threshold)
            {
                for company in self.table.by_alias(alias) {
                    out.push(ResolvedEntity {
                        cik: company.cik,
                        name: company.name.clone(),
                        confidence: score,
                        method: MatchMethod::Fuzzy,
                    });
                }
            }
        }

        out
    }
}

/// Ticker shape: 1-5 characters, all ASCII uppercase letters.
fn looks_like_ticker(token: &str) -> bool {
    !token.is_empty() && token.len() <= 5 && token.bytes().all(|b| b.is_ascii_uppercase())
}

/// Lowercase alphanumeric tokens of the text, punctuation-split.
fn alias_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::CompanyRecord;

    fn resolver() -> EntityResolver {
        EntityResolver::new(AliasTable::new(vec![
            CompanyRecord {
                cik: 1_045_810,
                name: "NVIDIA CORP".into(),
                ticker: Some("NVDA".into()),
                aliases: vec![],
            },
            CompanyRecord {
                cik: 320_193,
                name: "Apple Inc.".into(),
                ticker: Some("AAPL".into()),
                aliases: vec!["apple".into()],
            },
            CompanyRecord {
                cik: 789_019,
                name: "MICROSOFT CORP".into(),
                ticker: Some("MSFT".into()),
                aliases: vec!["microsoft".into()],
            },
        ]))
    }

    #[test]
    fn exact_ticker_match() {
        let entities = resolver().resolve("What was NVDA revenue in 2020?");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].cik, 1_045_810);
        assert_eq!(entities[0].method, MatchMethod::Exact);
        assert_eq!(entities[0].confidence, 1.0);
    }

    #[test]
    fn lowercase_ticker_shape_does_not_trigger_ticker_tier() {
        // "nvda" is not ticker-shaped, but it is also not an alias, so
        // the fuzzy tier picks up "nvidia" only if close enough.
        let entities = resolver().resolve("what did nvda report?");
        assert!(entities.iter().all(|e| e.method != MatchMethod::Exact));
    }

    #[test]
    fn alias_match() {
        let entities = resolver().resolve("How did Apple describe supply risk?");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].cik, 320_193);
        assert_eq!(entities[0].method, MatchMethod::Alias);
    }

    #[test]
    fn cik_literal_match() {
        let entities = resolver().resolve("filings for 1045810");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].cik, 1_045_810);
        assert_eq!(entities[0].method, MatchMethod::Exact);
    }

    #[test]
    fn fuzzy_only_when_exact_empty() {
        let entities = resolver().resolve("revenue trend for Microsft");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].cik, 789_019);
        assert_eq!(entities[0].method, MatchMethod::Fuzzy);
        assert!(entities[0].confidence >= 0.85);
    }

    #[test]
    fn exact_hit_suppresses_fuzzy_tier() {
        // "Apple" matches exactly; the typo'd "Microsft" must not be
        // resolved because tier 2 never runs.
        let entities = resolver().resolve("compare Apple and Microsft");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].cik, 320_193);
    }

    #[test]
    fn multiple_exact_entities() {
        let entities = resolver().resolve("compare Apple and Microsoft margins");
        let ciks: Vec<u64> = entities.iter().map(|e| e.cik).collect();
        assert_eq!(ciks, vec![320_193, 789_019]);
    }

    #[test]
    fn duplicate_mentions_dedup_to_best() {
        let entities = resolver().resolve("AAPL, also known as Apple");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].confidence, 1.0);
        assert_eq!(entities[0].method, MatchMethod::Exact);
    }

    #[test]
    fn short_tokens_skip_fuzzy() {
        let entities = resolver().resolve("apl report");
        assert!(entities.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        let first = r.resolve("compare Apple and Microsoft");
        let second = r.resolve("compare Apple and Microsoft");
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.cik, b.cik);
            assert_eq!(a.confidence, b.confidence);
        }
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(resolver().resolve("what are typical risk factors?").is_empty());
    }
}
