//! Prompt rendering of the assembled context.
//!
//! Each window prints under a `=== document | year | section ===`
//! header; each sentence carries its `[doc|section|idx]` citation
//! marker so the generator can cite by copying the marker verbatim.

use std::fmt::Write;

use finsight_core::AssembledContext;

/// Render the evidence block of the synthesis prompt.
pub fn render_context(context: &AssembledContext) -> String {
    let mut out = String::new();

    if !context.kpi_facts.is_empty() {
        out.push_str("Structured metrics:\n");
        for fact in &context.kpi_facts {
            let _ = write!(
                out,
                "- {} ({}): {}",
                fact.metric,
                fact.fiscal_year,
                fact.value_text()
            );
            if let Some(unit) = &fact.unit {
                let _ = write!(out, " {unit}");
            }
            out.push('\n');
        }
        out.push('\n');
    }

    for window in &context.windows {
        let _ = writeln!(
            out,
            "=== {} | {} | {} ===",
            window.document_id, window.fiscal_year, window.section_id
        );
        for sentence in &window.sentences {
            let _ = writeln!(
                out,
                "[{}|{}|{}] {}",
                window.document_id, window.section_id, sentence.index, sentence.text
            );
        }
        out.push('\n');
    }

    out
}
