//! Structured KPI facts — the second supply line.
//!
//! Facts come from an external, already-validated table keyed by
//! (entity, fiscal year, metric name). The core consumes them as opaque
//! records; it never derives or recomputes values.

use serde::{Deserialize, Serialize};

/// One numeric fact from the structured metric table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiFact {
    /// Canonical company identifier (SEC CIK).
    pub cik: u64,

    /// Fiscal year the fact applies to.
    pub fiscal_year: i32,

    /// Canonical metric name (e.g. "income_stmt_Revenue").
    pub metric: String,

    /// The numeric value.
    pub value: f64,

    /// Optional unit label ("USD", "USD millions", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl KpiFact {
    /// Render the value the way it appears in prompts and grounding
    /// checks: plain digits, no thousands separators, integers without
    /// a trailing ".0".
    pub fn value_text(&self) -> String {
        if self.value.fract() == 0.0 && self.value.abs() < 1e15 {
            format!("{}", self.value as i64)
        } else {
            format!("{}", self.value)
        }
    }
}
