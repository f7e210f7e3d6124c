//! Synthesis prompts.
//!
//! The context block already carries one `[document|section|index]`
//! marker per evidence sentence; the prompt instructs the model to
//! reuse those markers verbatim so the validator can resolve every
//! citation back into provenance.

/// System instruction for answer synthesis.
pub const SYNTHESIS_SYSTEM: &str = "You are a financial research assistant answering questions \
     about SEC filings. Answer only from the provided evidence. After each factual statement, \
     cite its source by copying the bracketed [document|section|index] marker of the supporting \
     sentence. If the evidence does not answer the question, say so plainly.";

/// The first synthesis prompt.
pub fn synthesis_prompt(question: &str, context: &str) -> String {
    format!("Evidence:\n\n{context}\n\nQuestion: {question}\n\nAnswer:")
}

/// The stricter prompt used for the single regeneration after a failed
/// grounding check.
pub fn regeneration_prompt(question: &str, context: &str) -> String {
    format!(
        "Evidence:\n\n{context}\n\nQuestion: {question}\n\nYour previous answer contained \
         statements that could not be verified against the evidence above. Answer again, using \
         only facts and numbers that appear verbatim in the evidence, and cite every statement \
         by copying its bracketed marker. Do not introduce any figure that is not shown.\n\n\
         Answer:"
    )
}
