//! LLM-backed query variant generation.
//!
//! Variant 0 is always the user's original text. Rephrasings and
//! decompositions come from bounded generator calls; every failure
//! mode degrades to whatever was already produced, so the variant
//! list is never empty and retrieval always proceeds.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use finsight_core::{GenerationRequest, Generator, Query, QueryType, QueryVariant};

/// Knobs for variant generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum rephrased variants kept from one call (2..=4 useful).
    pub max_variants: usize,

    /// Rephrasings shorter than this are discarded as degenerate.
    pub min_variant_len: usize,

    /// Questions shorter than this skip LLM calls entirely.
    pub min_query_len: usize,

    /// Per-call timeout for the generator.
    pub call_timeout: Duration,

    /// Sampling temperature for rephrase/decompose calls.
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_variants: 3,
            min_variant_len: 10,
            min_query_len: 12,
            call_timeout: Duration::from_secs(10),
            temperature: 0.7,
        }
    }
}

/// Produces the variant list for one query.
pub struct VariantPlanner {
    generator: Arc<dyn Generator>,
    config: PlannerConfig,
}

impl VariantPlanner {
    pub fn new(generator: Arc<dyn Generator>, config: PlannerConfig) -> Self {
        Self { generator, config }
    }

    /// Build the variant list. Never returns an empty vector.
    pub async fn plan(&self, query: &Query, query_type: QueryType) -> Vec<QueryVariant> {
        let mut variants = vec![QueryVariant::original(&query.text)];

        // KPI questions are answered from the structured table plus a
        // single retrieval pass; rephrasing buys nothing.
        if query_type == QueryType::Kpi {
            return variants;
        }

        if query.text.trim().len() < self.config.min_query_len {
            debug!(len = query.text.len(), "query too short, skipping variant generation");
            return variants;
        }

        match self.call(rephrase_prompt(&query.text)).await {
            Ok(text) => {
                let parsed = parse_variant_lines(&text, &query.text, self.config.min_variant_len);
                let keep = parsed.into_iter().take(self.config.max_variants);
                variants.extend(keep.map(|t| QueryVariant::rephrase(t)));
            }
            Err(reason) => warn!(%reason, "variant rephrase call failed, continuing with original"),
        }

        if query_type == QueryType::MultiHop {
            match self.call(decompose_prompt(&query.text)).await {
                Ok(text) => {
                    let parsed =
                        parse_variant_lines(&text, &query.text, self.config.min_variant_len);
                    let keep = parsed.into_iter().take(self.config.max_variants);
                    variants.extend(keep.map(|t| QueryVariant::decomposed(t)));
                }
                Err(reason) => warn!(%reason, "decomposition call failed, continuing without sub-questions"),
            }
        }

        dedup_variants(&mut variants);
        variants
    }

    async fn call(&self, prompt: String) -> Result<String, String> {
        let request = GenerationRequest {
            system: "You rewrite financial research questions. Output one question per line, \
                     nothing else."
                .into(),
            prompt,
            temperature: self.config.temperature,
            max_tokens: 256,
        };

        match timeout(self.config.call_timeout, self.generator.complete(request)).await {
            Ok(Ok(response)) => Ok(response.text),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("generator call timed out".into()),
        }
    }
}

fn rephrase_prompt(question: &str) -> String {
    format!(
        "Rephrase the following question about SEC filings in different words, keeping the \
         same meaning. Produce up to 3 rephrasings, one per line.\n\nQuestion: {question}"
    )
}

fn decompose_prompt(question: &str) -> String {
    format!(
        "Break the following comparison question about SEC filings into simpler single-entity, \
         single-period sub-questions, one per line.\n\nQuestion: {question}"
    )
}

/// Parse generator output into candidate variant texts: one per line,
/// list numbering stripped, too-short lines and echoes of the original
/// dropped.
fn parse_variant_lines(output: &str, original: &str, min_len: usize) -> Vec<String> {
    let original_lower = original.trim().to_lowercase();
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();

    for line in output.lines() {
        let cleaned = strip_list_prefix(line.trim()).trim().to_string();
        if cleaned.len() < min_len {
            continue;
        }
        let lower = cleaned.to_lowercase();
        if lower == original_lower || seen.contains(&lower) {
            continue;
        }
        seen.push(lower);
        out.push(cleaned);
    }

    out
}

/// Strip leading list markers: "1.", "2)", "-", "*", "•".
fn strip_list_prefix(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < line.len() {
        // A digit prefix counts only with a list delimiter after it.
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped;
        }
        return line;
    }
    line.trim_start_matches(['-', '*', '\u{2022}'])
}

fn dedup_variants(variants: &mut Vec<QueryVariant>) {
    let mut seen: Vec<String> = Vec::new();
    variants.retain(|v| {
        let key = v.text.trim().to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finsight_core::{GenerationResponse, ServiceError, VariantKind};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedGenerator {
        outputs: Vec<String>,
        calls: AtomicU32,
    }

    impl ScriptedGenerator {
        fn new(outputs: &[&str]) -> Self {
            Self {
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ServiceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let text = self
                .outputs
                .get(call)
                .or_else(|| self.outputs.last())
                .cloned()
                .unwrap_or_default();
            Ok(GenerationResponse { text, usage: None })
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ServiceError> {
            Err(ServiceError::Network("connection refused".into()))
        }
    }

    struct HangingGenerator;

    #[async_trait]
    impl Generator for HangingGenerator {
        async fn complete(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, ServiceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn query(text: &str) -> Query {
        Query::new(text)
    }

    #[tokio::test]
    async fn variant_zero_is_always_the_original() {
        let planner = VariantPlanner::new(
            Arc::new(ScriptedGenerator::new(&[
                "1. How did revenue develop at NVIDIA?\n2. What revenue did NVIDIA report?",
            ])),
            PlannerConfig::default(),
        );
        let variants = planner
            .plan(&query("What was NVIDIA's revenue trend?"), QueryType::Narrative)
            .await;
        assert_eq!(variants[0].kind, VariantKind::Original);
        assert_eq!(variants[0].text, "What was NVIDIA's revenue trend?");
        assert_eq!(variants.len(), 3);
    }

    #[tokio::test]
    async fn kpi_query_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new(&["unused"]));
        let planner = VariantPlanner::new(generator.clone(), PlannerConfig::default());
        let variants = planner
            .plan(&query("What was NVDA revenue in 2020?"), QueryType::Kpi)
            .await;
        assert_eq!(variants.len(), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_query_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new(&["unused"]));
        let planner = VariantPlanner::new(generator.clone(), PlannerConfig::default());
        let variants = planner.plan(&query("revenue?"), QueryType::Narrative).await;
        assert_eq!(variants.len(), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_original() {
        let planner = VariantPlanner::new(Arc::new(FailingGenerator), PlannerConfig::default());
        let variants = planner
            .plan(&query("How did margins evolve across years?"), QueryType::Narrative)
            .await;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].kind, VariantKind::Original);
    }

    #[tokio::test]
    async fn hanging_generator_times_out_and_degrades() {
        let config = PlannerConfig {
            call_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let planner = VariantPlanner::new(Arc::new(HangingGenerator), config);
        let variants = planner
            .plan(&query("How did margins evolve across years?"), QueryType::Narrative)
            .await;
        assert_eq!(variants.len(), 1);
    }

    #[tokio::test]
    async fn multi_hop_adds_decomposed_variants() {
        let planner = VariantPlanner::new(
            Arc::new(ScriptedGenerator::new(&[
                "How do Apple and Microsoft gross margins differ in 2020?",
                "What was Apple's gross margin in 2020?\nWhat was Microsoft's gross margin in 2020?",
            ])),
            PlannerConfig::default(),
        );
        let variants = planner
            .plan(
                &query("Compare Apple and Microsoft gross margin in 2020"),
                QueryType::MultiHop,
            )
            .await;
        assert_eq!(
            variants
                .iter()
                .filter(|v| v.kind == VariantKind::Decomposed)
                .count(),
            2
        );
        // Variants are unique after dedup.
        let texts: Vec<&str> = variants.iter().map(|v| v.text.as_str()).collect();
        let mut sorted = texts.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), texts.len());
    }

    #[test]
    fn parse_strips_numbering_and_bullets() {
        let parsed = parse_variant_lines(
            "1. First rephrased question here\n2) Second rephrased question here\n- Third rephrased question here\n* Fourth rephrased question here",
            "original question",
            10,
        );
        assert_eq!(parsed.len(), 4);
        assert!(parsed.iter().all(|v| !v.starts_with(['1', '2', '-', '*'])));
    }

    #[test]
    fn parse_drops_short_lines_echoes_and_duplicates() {
        let parsed = parse_variant_lines(
            "ok\nOriginal Question\nA usable rephrased question\na usable rephrased question",
            "original question",
            10,
        );
        assert_eq!(parsed, vec!["A usable rephrased question"]);
    }

    #[test]
    fn parse_keeps_year_leading_questions() {
        // A line starting with a year is not list numbering.
        let parsed = parse_variant_lines("2020 revenue details for NVIDIA", "q", 10);
        assert_eq!(parsed, vec!["2020 revenue details for NVIDIA"]);
    }
}
