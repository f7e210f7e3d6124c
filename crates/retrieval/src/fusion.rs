//! Fusion, quality floor and ranking over raw path results.
//!
//! Pure functions; the async orchestrator feeds them and the tests
//! exercise them directly.

use std::collections::BTreeMap;

use finsight_core::{HitKey, RetrievalHit, RetrievalPath, VectorMatch};

/// Raw matches from one (path, variant) call.
#[derive(Debug)]
pub struct Contribution {
    pub path: RetrievalPath,
    pub variant: usize,
    pub matches: Vec<VectorMatch>,
}

/// Deduplicate by hit key. The surviving hit keeps the minimum distance
/// observed and the union of contributing paths and variant indices.
pub fn fuse(contributions: Vec<Contribution>) -> Vec<RetrievalHit> {
    let mut fused: BTreeMap<HitKey, RetrievalHit> = BTreeMap::new();

    for contribution in contributions {
        for m in contribution.matches {
            let key = HitKey {
                document_id: m.document_id,
                section_id: m.section_id,
                sentence_index: m.sentence_index,
            };
            match fused.get_mut(&key) {
                Some(hit) => {
                    hit.distance = hit.distance.min(m.distance);
                    hit.paths.insert(contribution.path);
                    hit.variants.insert(contribution.variant);
                    if hit.text.is_empty() && !m.text.is_empty() {
                        hit.text = m.text;
                    }
                }
                None => {
                    fused.insert(
                        key.clone(),
                        RetrievalHit {
                            key,
                            fiscal_year: m.fiscal_year,
                            section_len: m.section_len,
                            distance: m.distance,
                            text: m.text,
                            paths: [contribution.path].into(),
                            variants: [contribution.variant].into(),
                        },
                    );
                }
            }
        }
    }

    fused.into_values().collect()
}

/// Drop hits beyond `max_distance`, but only when at least `min_keep`
/// better hits survive. Sparse evidence is kept wholesale rather than
/// leaving the question with nothing.
pub fn apply_quality_floor(hits: &mut Vec<RetrievalHit>, max_distance: f32, min_keep: usize) {
    let survivors = hits.iter().filter(|h| h.distance <= max_distance).count();
    if survivors >= min_keep {
        hits.retain(|h| h.distance <= max_distance);
    }
}

/// Rank by distance ascending; ties break by best path priority
/// (filtered beats global beats expansion-only), then by key for
/// determinism.
pub fn rank(hits: &mut [RetrievalHit]) {
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.best_path_priority().cmp(&b.best_path_priority()))
            .then_with(|| a.key.cmp(&b.key))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(doc: &str, idx: u32, distance: f32) -> VectorMatch {
        VectorMatch {
            document_id: doc.into(),
            section_id: "1A".into(),
            sentence_index: idx,
            fiscal_year: 2020,
            section_len: 100,
            distance,
            text: format!("sentence {idx} of {doc}"),
        }
    }

    #[test]
    fn fuse_dedups_and_unions() {
        let hits = fuse(vec![
            Contribution {
                path: RetrievalPath::Filtered,
                variant: 0,
                matches: vec![m("doc1", 5, 0.40)],
            },
            Contribution {
                path: RetrievalPath::Global,
                variant: 1,
                matches: vec![m("doc1", 5, 0.35), m("doc2", 9, 0.50)],
            },
        ]);

        assert_eq!(hits.len(), 2);
        let fused = hits.iter().find(|h| h.key.document_id == "doc1").unwrap();
        assert_eq!(fused.distance, 0.35);
        assert!(fused.paths.contains(&RetrievalPath::Filtered));
        assert!(fused.paths.contains(&RetrievalPath::Global));
        assert_eq!(fused.variants, [0usize, 1].into());
    }

    #[test]
    fn quality_floor_drops_far_hits_when_enough_survive() {
        let mut hits = fuse(vec![Contribution {
            path: RetrievalPath::Global,
            variant: 0,
            matches: vec![
                m("a", 1, 0.2),
                m("b", 2, 0.3),
                m("c", 3, 0.4),
                m("d", 4, 1.8),
            ],
        }]);
        apply_quality_floor(&mut hits, 1.0, 3);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.distance <= 1.0));
    }

    #[test]
    fn quality_floor_never_discards_sparse_evidence() {
        let mut hits = fuse(vec![Contribution {
            path: RetrievalPath::Global,
            variant: 0,
            matches: vec![m("a", 1, 1.6), m("b", 2, 1.9)],
        }]);
        apply_quality_floor(&mut hits, 1.0, 3);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn rank_breaks_distance_ties_by_path_priority() {
        let mut hits = fuse(vec![
            Contribution {
                path: RetrievalPath::Global,
                variant: 0,
                matches: vec![m("global-doc", 1, 0.4)],
            },
            Contribution {
                path: RetrievalPath::Filtered,
                variant: 0,
                matches: vec![m("filtered-doc", 2, 0.4)],
            },
        ]);
        rank(&mut hits);
        assert_eq!(hits[0].key.document_id, "filtered-doc");
        assert_eq!(hits[1].key.document_id, "global-doc");
    }

    #[test]
    fn rank_is_deterministic_on_full_ties() {
        let mut hits = fuse(vec![Contribution {
            path: RetrievalPath::Global,
            variant: 0,
            matches: vec![m("zeta", 1, 0.4), m("alpha", 1, 0.4)],
        }]);
        rank(&mut hits);
        assert_eq!(hits[0].key.document_id, "alpha");
    }
}
