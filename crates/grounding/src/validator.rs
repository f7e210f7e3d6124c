//! Claim-level grounding validation.
//!
//! Every citation the answer claims must resolve into the assembled
//! context's provenance. Uncited claim sentences pass through a
//! content-word overlap check against the context text, and any number
//! asserted in a claim must appear in the context or in the structured
//! KPI facts. The validator never consults external services; it only
//! compares the answer against the evidence it was given.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use finsight_core::{AssembledContext, ClaimCheck, GroundingVerdict, SynthesisResult};

use crate::citation::{extract_citations, strip_citations};

/// Validation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Minimum content-word overlap ratio for an uncited claim.
    pub overlap_threshold: f32,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
        }
    }
}

/// Validates a synthesized answer against its evidence.
#[derive(Debug, Clone, Default)]
pub struct GroundingValidator {
    config: GroundingConfig,
}

impl GroundingValidator {
    pub fn new(config: GroundingConfig) -> Self {
        Self { config }
    }

    /// Check every claim sentence of the answer. The verdict is
    /// grounded only when all claims pass.
    pub fn validate(
        &self,
        result: &SynthesisResult,
        context: &AssembledContext,
    ) -> GroundingVerdict {
        let corpus = Corpus::from_context(context);
        let mut claims = Vec::new();

        for sentence in split_sentences(&result.answer) {
            let citations = extract_citations(&sentence);
            let claim = strip_citations(&sentence);
            if claim.is_empty() {
                continue;
            }

            let check = self.check_claim(&claim, &citations, context, &corpus);
            claims.push(check);
        }

        let grounded = !claims.is_empty() && claims.iter().all(|c| c.supported);
        if !grounded {
            debug!(
                failures = claims.iter().filter(|c| !c.supported).count(),
                "answer failed grounding"
            );
        }
        GroundingVerdict { grounded, claims }
    }

    fn check_claim(
        &self,
        claim: &str,
        citations: &[finsight_core::Citation],
        context: &AssembledContext,
        corpus: &Corpus,
    ) -> ClaimCheck {
        // Citations must resolve, whatever else the claim contains.
        for citation in citations {
            if !context.has_provenance(
                &citation.document_id,
                &citation.section_id,
                citation.sentence_index,
            ) {
                return ClaimCheck {
                    claim: claim.to_string(),
                    supported: false,
                    reason: format!("citation {citation} not found in context provenance"),
                };
            }
        }

        // Numbers asserted by the claim must exist in the evidence.
        for number in numeric_tokens(claim) {
            if !corpus.numbers.contains(&number) {
                return ClaimCheck {
                    claim: claim.to_string(),
                    supported: false,
                    reason: format!("number {number} not present in context or KPI facts"),
                };
            }
        }

        if !citations.is_empty() {
            return ClaimCheck {
                claim: claim.to_string(),
                supported: true,
                reason: "all citations resolve".into(),
            };
        }

        // Uncited claim: content-word overlap against the context text.
        let words = content_words(claim);
        if words.is_empty() {
            return ClaimCheck {
                claim: claim.to_string(),
                supported: true,
                reason: "no checkable content".into(),
            };
        }
        let matched = words.iter().filter(|w| corpus.words.contains(*w)).count();
        let ratio = matched as f32 / words.len() as f32;
        if ratio >= self.config.overlap_threshold {
            ClaimCheck {
                claim: claim.to_string(),
                supported: true,
                reason: format!("uncited, content overlap {ratio:.2}"),
            }
        } else {
            ClaimCheck {
                claim: claim.to_string(),
                supported: false,
                reason: format!(
                    "uncited and content overlap {ratio:.2} below threshold {:.2}",
                    self.config.overlap_threshold
                ),
            }
        }
    }
}

/// Normalized lookup material built once per validation.
struct Corpus {
    words: BTreeSet<String>,
    numbers: BTreeSet<String>,
}

impl Corpus {
    fn from_context(context: &AssembledContext) -> Self {
        let mut words = BTreeSet::new();
        let mut numbers = BTreeSet::new();

        for window in &context.windows {
            numbers.insert(window.fiscal_year.to_string());
            for sentence in &window.sentences {
                words.extend(content_words(&sentence.text));
                numbers.extend(numeric_tokens(&sentence.text));
            }
        }
        for fact in &context.kpi_facts {
            numbers.insert(fact.value_text());
            numbers.insert(fact.fiscal_year.to_string());
            words.extend(content_words(&fact.metric));
        }

        Self { words, numbers }
    }
}

/// Lowercased words longer than three characters, digits excluded.
fn content_words(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3 && !w.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Numeric tokens normalized for comparison: separators, currency and
/// percent signs removed, so "26,914" in a claim matches "26914" in
/// the KPI table.
fn numeric_tokens(text: &str) -> BTreeSet<String> {
    let mut numbers = BTreeSet::new();
    for raw in text.split_whitespace() {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let cleaned = cleaned.trim_matches('.');
        if !cleaned.is_empty() && cleaned.bytes().any(|b| b.is_ascii_digit()) {
            // Skip pure punctuation artifacts; keep digit-bearing tokens
            // only when the raw token was number-like to begin with.
            let number_like = raw
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '$' | '%' | '(' | ')'));
            if number_like {
                numbers.insert(cleaned.to_string());
            }
        }
    }
    numbers
}

/// Split on sentence enders followed by whitespace, so decimals like
/// "10.9" stay intact.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let boundary = chars.peek().is_none_or(|next| next.is_whitespace());
            if boundary {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
