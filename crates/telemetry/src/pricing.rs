//! Pricing table for cost estimation.
//!
//! Prices are in USD per 1 million tokens. Unknown models cost zero
//! rather than failing the question.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute cost for the given token counts.
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Pricing table with built-in defaults and custom overrides.
#[derive(Debug, Clone)]
pub struct PricingTable {
    prices: HashMap<String, ModelPricing>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PricingTable {
    /// A table pre-loaded with the models the pipeline commonly uses.
    pub fn with_defaults() -> Self {
        let mut prices = HashMap::new();

        prices.insert("gpt-4o".into(), ModelPricing::new(2.5, 10.0));
        prices.insert("gpt-4o-mini".into(), ModelPricing::new(0.15, 0.6));
        prices.insert(
            "claude-3-5-haiku-latest".into(),
            ModelPricing::new(0.8, 4.0),
        );
        prices.insert(
            "claude-sonnet-4".into(),
            ModelPricing::new(3.0, 15.0),
        );
        prices.insert(
            "text-embedding-3-small".into(),
            ModelPricing::new(0.02, 0.0),
        );
        prices.insert(
            "text-embedding-3-large".into(),
            ModelPricing::new(0.13, 0.0),
        );

        Self { prices }
    }

    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// Add or override a model price.
    pub fn set(&mut self, model: impl Into<String>, pricing: ModelPricing) {
        self.prices.insert(model.into(), pricing);
    }

    /// Estimated cost of one call. Unknown models are free.
    pub fn cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        self.prices
            .get(model)
            .map(|p| p.cost(input_tokens, output_tokens))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_cost() {
        let table = PricingTable::with_defaults();
        // 1M input + 1M output of gpt-4o-mini.
        let cost = table.cost("gpt-4o-mini", 1_000_000, 1_000_000);
        assert!((cost - 0.75).abs() < 1e-10);
    }

    #[test]
    fn unknown_model_is_free() {
        let table = PricingTable::with_defaults();
        assert_eq!(table.cost("mystery-model", 1000, 1000), 0.0);
    }

    #[test]
    fn override_replaces_default() {
        let mut table = PricingTable::empty();
        table.set("local-llm", ModelPricing::new(0.0, 0.0));
        assert_eq!(table.cost("local-llm", 5000, 5000), 0.0);
    }

    #[test]
    fn embedding_models_have_no_output_price() {
        let table = PricingTable::with_defaults();
        let cost = table.cost("text-embedding-3-small", 1_000_000, 0);
        assert!((cost - 0.02).abs() < 1e-10);
    }
}
