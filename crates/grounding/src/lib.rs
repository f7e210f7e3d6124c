//! Grounding validation for synthesized answers.
//!
//! Answers cite evidence with `[document|section|index]` markers. This
//! crate parses the markers and checks every claim against the
//! assembled context: cited claims must resolve into provenance,
//! uncited claims must overlap the context text, and asserted numbers
//! must exist in the evidence or the structured KPI facts.

pub mod citation;
pub mod validator;

pub use citation::{extract_citations, strip_citations};
pub use validator::{GroundingConfig, GroundingValidator};
