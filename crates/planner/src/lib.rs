//! Query planning: classification and variant generation.
//!
//! The planner decides how a question will be retrieved. Classification
//! is pure rules; variant generation makes bounded LLM calls and
//! degrades to the original text on any failure.

pub mod classify;
pub mod variants;

pub use classify::classify;
pub use variants::{PlannerConfig, VariantPlanner};
