//! File-backed KPI store.
//!
//! The structured metric table arrives as a pre-validated JSON array of
//! facts; it is loaded once at startup into a keyed map. Lookups never
//! touch the filesystem again.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use finsight_core::{KpiFact, KpiStore, ServiceError};

/// KPI table loaded from a JSON file.
#[derive(Debug, Default)]
pub struct JsonKpiStore {
    facts: HashMap<(u64, i32, String), KpiFact>,
}

impl JsonKpiStore {
    /// Load the table from a JSON array of facts.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::NotConfigured(format!("KPI table {}: {e}", path.display()))
        })?;
        let facts: Vec<KpiFact> = serde_json::from_str(&raw)
            .map_err(|e| ServiceError::Malformed(format!("KPI table {}: {e}", path.display())))?;

        info!(facts = facts.len(), path = %path.display(), "KPI table loaded");
        Ok(Self::from_facts(facts))
    }

    /// Build directly from facts (tests, embedded tables).
    pub fn from_facts(facts: impl IntoIterator<Item = KpiFact>) -> Self {
        let facts = facts
            .into_iter()
            .map(|f| ((f.cik, f.fiscal_year, f.metric.clone()), f))
            .collect();
        Self { facts }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[async_trait]
impl KpiStore for JsonKpiStore {
    async fn lookup(
        &self,
        cik: u64,
        fiscal_year: i32,
        metric: &str,
    ) -> Result<Option<KpiFact>, ServiceError> {
        Ok(self
            .facts
            .get(&(cik, fiscal_year, metric.to_string()))
            .cloned())
    }
}
