//! Entity resolution for financial questions.
//!
//! Three deterministic extractors run before any retrieval:
//!
//! - [`EntityResolver`]: company mentions → CIKs, via exact ticker,
//!   alias and CIK-literal tiers with a fuzzy fallback
//! - [`YearExtractor`]: fiscal-year mentions, range-expanded
//! - [`MetricCatalog`]: metric phrasings → canonical KPI names
//!
//! No extractor makes network calls; all state is loaded at startup.

pub mod alias;
pub mod fuzzy;
pub mod metrics;
pub mod resolver;
pub mod years;

pub use alias::{AliasTable, CompanyRecord};
pub use metrics::MetricCatalog;
pub use resolver::EntityResolver;
pub use years::YearExtractor;
