//! Context window construction.
//!
//! Direct hits anchor windows; each anchor expands by the configured
//! radius, clamps to section bounds, and overlapping or adjacent
//! ranges in the same section merge into one window. Sentence text is
//! populated from every fused hit inside the range, so expansion
//! neighbors fill the gaps between anchors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use finsight_core::{
    AssembledContext, ContextWindow, KpiFact, OrderingMode, Provenance, QueryType, RetrievalHit,
    SentenceSpan,
};

/// Assembly knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Sentences taken on each side of an anchor hit.
    pub window_radius: u32,

    /// Whole-window budget; excess windows are dropped entirely,
    /// contents are never truncated.
    pub max_windows: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            window_radius: 3,
            max_windows: 8,
        }
    }
}

/// Build the assembled context from ranked hits and KPI facts.
pub fn assemble(
    hits: &[RetrievalHit],
    kpi_facts: Vec<KpiFact>,
    query_type: QueryType,
    config: &AssemblerConfig,
) -> AssembledContext {
    let ordering = match query_type {
        QueryType::Kpi => OrderingMode::Relevance,
        QueryType::Narrative | QueryType::MultiHop => OrderingMode::Chronological,
    };

    // Bucket all hits by section; direct hits anchor windows.
    let mut sections: BTreeMap<(String, String), Vec<&RetrievalHit>> = BTreeMap::new();
    for hit in hits {
        sections
            .entry((hit.key.document_id.clone(), hit.key.section_id.clone()))
            .or_default()
            .push(hit);
    }

    let mut windows = Vec::new();
    for ((document_id, section_id), section_hits) in &sections {
        let anchors: Vec<&&RetrievalHit> =
            section_hits.iter().filter(|h| h.is_direct()).collect();
        if anchors.is_empty() {
            continue;
        }

        let ranges = merged_ranges(&anchors, config.window_radius);
        for range in ranges {
            windows.push(build_window(
                document_id,
                section_id,
                range,
                section_hits,
            ));
        }
    }

    // Budget enforcement: keep the most relevant whole windows.
    if windows.len() > config.max_windows {
        windows.sort_by(|a, b| a.best_distance.total_cmp(&b.best_distance));
        debug!(
            dropped = windows.len() - config.max_windows,
            "window budget exceeded, dropping least relevant windows"
        );
        windows.truncate(config.max_windows);
    }

    match ordering {
        OrderingMode::Relevance => {
            windows.sort_by(|a, b| a.best_distance.total_cmp(&b.best_distance));
        }
        OrderingMode::Chronological => {
            windows.sort_by(|a, b| {
                a.fiscal_year
                    .cmp(&b.fiscal_year)
                    .then_with(|| a.document_id.cmp(&b.document_id))
                    .then_with(|| a.section_id.cmp(&b.section_id))
                    .then_with(|| a.start.cmp(&b.start))
            });
        }
    }

    AssembledContext {
        windows,
        kpi_facts,
        ordering,
    }
}

#[derive(Debug, Clone, Copy)]
struct Range {
    start: u32,
    end: u32,
    edge_safe: bool,
}

/// Expand each anchor by the radius, clamp to the section, and merge
/// intersecting or adjacent ranges.
fn merged_ranges(anchors: &[&&RetrievalHit], radius: u32) -> Vec<Range> {
    let mut ranges: Vec<Range> = anchors
        .iter()
        .map(|hit| {
            let pos = hit.key.sentence_index;
            let last = hit.section_len.saturating_sub(1);
            let left_clamped = pos < radius;
            let right_clamped = pos + radius > last;
            Range {
                start: pos.saturating_sub(radius),
                end: (pos + radius).min(last),
                edge_safe: !(left_clamped || right_clamped),
            }
        })
        .collect();

    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<Range> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            // Adjacent ranges merge too: [2,8] and [9,15] form one run.
            Some(prev) if range.start <= prev.end.saturating_add(1) => {
                prev.end = prev.end.max(range.end);
                prev.edge_safe = prev.edge_safe && range.edge_safe;
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn build_window(
    document_id: &str,
    section_id: &str,
    range: Range,
    section_hits: &[&RetrievalHit],
) -> ContextWindow {
    let in_range: Vec<&&RetrievalHit> = section_hits
        .iter()
        .filter(|h| h.key.sentence_index >= range.start && h.key.sentence_index <= range.end)
        .collect();

    let mut sentences: Vec<SentenceSpan> = in_range
        .iter()
        .map(|h| SentenceSpan {
            index: h.key.sentence_index,
            text: h.text.clone(),
        })
        .collect();
    sentences.sort_by_key(|s| s.index);
    sentences.dedup_by_key(|s| s.index);

    let mut provenance = Vec::new();
    for hit in &in_range {
        for path in &hit.paths {
            provenance.push(Provenance {
                document_id: document_id.to_string(),
                section_id: section_id.to_string(),
                sentence_index: hit.key.sentence_index,
                path: *path,
            });
        }
    }

    let best_distance = in_range
        .iter()
        .filter(|h| h.is_direct())
        .map(|h| h.distance)
        .fold(f32::INFINITY, f32::min);

    let fiscal_year = in_range.first().map(|h| h.fiscal_year).unwrap_or_default();

    ContextWindow {
        document_id: document_id.to_string(),
        section_id: section_id.to_string(),
        fiscal_year,
        start: range.start,
        end: range.end,
        edge_safe: range.edge_safe,
        sentences,
        best_distance,
        provenance,
    }
}
