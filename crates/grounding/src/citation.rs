//! Citation marker parsing.
//!
//! Markers follow the `[document|section|index]` grammar emitted by
//! the prompt renderer. The parser is tolerant: malformed brackets are
//! left alone and skipped, never an error, because generator output is
//! untrusted.

use finsight_core::Citation;

/// Extract every well-formed citation marker from answer text, in
/// order of appearance. Duplicates are preserved.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut citations = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }
        let Some(close) = text[i..].find(']').map(|p| i + p) else {
            break;
        };
        if let Some(citation) = parse_marker(&text[i + 1..close]) {
            citations.push(citation);
        }
        i = close + 1;
    }

    citations
}

/// Strip all well-formed citation markers, collapsing leftover double
/// spaces, to recover the plain claim text.
pub fn strip_citations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(close_rel) = rest[open..].find(']') else {
            break;
        };
        let close = open + close_rel;
        if parse_marker(&rest[open + 1..close]).is_some() {
            out.push_str(&rest[..open]);
            rest = &rest[close + 1..];
        } else {
            out.push_str(&rest[..close + 1]);
            rest = &rest[close + 1..];
        }
    }
    out.push_str(rest);

    let mut cleaned = String::with_capacity(out.len());
    let mut last_space = false;
    for c in out.chars() {
        if c == ' ' {
            if !last_space {
                cleaned.push(c);
            }
            last_space = true;
        } else {
            cleaned.push(c);
            last_space = false;
        }
    }
    cleaned.trim().to_string()
}

/// Parse the inside of a bracket pair: exactly two pipes, a non-empty
/// document and section, and a numeric sentence index.
fn parse_marker(inner: &str) -> Option<Citation> {
    let mut parts = inner.split('|');
    let document_id = parts.next()?;
    let section_id = parts.next()?;
    let index = parts.next()?;
    if parts.next().is_some() || document_id.is_empty() || section_id.is_empty() {
        return None;
    }
    let sentence_index: u32 = index.trim().parse().ok()?;
    Some(Citation {
        document_id: document_id.to_string(),
        section_id: section_id.to_string(),
        sentence_index,
    })
}
