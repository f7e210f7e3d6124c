//! The retrieval orchestrator: concurrent multi-path fan-out with
//! bounded timeouts, fusion, quality floor, ranking and window
//! expansion.
//!
//! Failures degrade rather than abort: a failed path is flagged and the
//! remaining paths' results are used. Only the total loss of every path
//! (or of every embedding) is an error.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use finsight_core::{
    Embedder, MetadataFilter, QueryVariant, ResolvedEntity, RetrievalError, RetrievalFlags,
    RetrievalHit, RetrievalPath, SentenceRecord, SentenceStore, VectorQuery, VectorSearch,
    YearHints,
};

use crate::fusion::{self, Contribution};

/// Retrieval knobs. Distances and counts here are empirically tuned,
/// so they live in configuration rather than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested per filtered-path call.
    pub top_k_filtered: usize,

    /// Candidates requested per global-path call.
    pub top_k_global: usize,

    /// Hard ceiling imposed by the vector service; requests clamp to it.
    pub top_k_ceiling: usize,

    /// Per-call timeout for embedding and vector queries.
    pub call_timeout: Duration,

    /// Hits beyond this distance are dropped by the quality floor.
    pub quality_floor_distance: f32,

    /// The floor applies only when at least this many closer hits survive.
    pub quality_floor_min_keep: usize,

    /// Neighbor radius for window expansion.
    pub window_radius: u32,

    /// How many top-ranked direct hits get window expansion.
    pub expand_top_n: usize,

    /// Total hit budget after expansion.
    pub max_hits: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_filtered: 10,
            top_k_global: 10,
            top_k_ceiling: 50,
            call_timeout: Duration::from_secs(10),
            quality_floor_distance: 1.2,
            quality_floor_min_keep: 3,
            window_radius: 3,
            expand_top_n: 5,
            max_hits: 50,
        }
    }
}

/// What retrieval produced for one question.
#[derive(Debug)]
pub struct RetrievalOutcome {
    /// Fused, floored, ranked and expanded hits.
    pub hits: Vec<RetrievalHit>,

    /// Path usage and degradation flags.
    pub flags: RetrievalFlags,

    /// Vector queries issued (for the trace).
    pub vector_queries: u32,
}

enum PathOutcome {
    Produced(Contribution),
    Failed,
    TimedOut,
}

enum ExpansionOutcome {
    Produced(Vec<SentenceRecord>),
    Failed,
    TimedOut,
}

/// Runs the multi-path retrieval fan-out.
pub struct RetrievalOrchestrator {
    vector: Arc<dyn VectorSearch>,
    embedder: Arc<dyn Embedder>,
    sentences: Arc<dyn SentenceStore>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(
        vector: Arc<dyn VectorSearch>,
        embedder: Arc<dyn Embedder>,
        sentences: Arc<dyn SentenceStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            vector,
            embedder,
            sentences,
            config,
        }
    }

    /// Retrieve evidence for all variants, bounded by `deadline`.
    ///
    /// An empty hit list with no error means the services answered and
    /// found nothing.
    pub async fn retrieve(
        &self,
        variants: &[QueryVariant],
        entities: &[ResolvedEntity],
        years: &YearHints,
        deadline: Instant,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let mut flags = RetrievalFlags::default();

        let embeddings = self.embed_variants(variants, deadline, &mut flags).await?;

        let filter = (!entities.is_empty()).then(|| MetadataFilter {
            ciks: entities.iter().map(|e| e.cik).collect(),
            year_range: years.range(),
        });

        let mut calls = Vec::new();
        for (variant_idx, embedding) in &embeddings {
            if let Some(filter) = &filter {
                calls.push(self.path_call(
                    RetrievalPath::Filtered,
                    *variant_idx,
                    embedding.clone(),
                    Some(filter.clone()),
                    deadline,
                ));
            }
            calls.push(self.path_call(
                RetrievalPath::Global,
                *variant_idx,
                embedding.clone(),
                None,
                deadline,
            ));
        }

        let vector_queries = calls.len() as u32;
        let outcomes = join_all(calls).await;

        let mut contributions = Vec::new();
        let mut filtered_attempted = false;
        let mut filtered_hits = 0usize;
        let mut global_hits = 0usize;
        for outcome in outcomes {
            match outcome {
                PathOutcome::Produced(c) => {
                    match c.path {
                        RetrievalPath::Filtered => {
                            filtered_attempted = true;
                            filtered_hits += c.matches.len();
                        }
                        RetrievalPath::Global => global_hits += c.matches.len(),
                        RetrievalPath::WindowExpansion => {}
                    }
                    contributions.push(c);
                }
                PathOutcome::Failed => flags.paths_failed += 1,
                PathOutcome::TimedOut => {
                    flags.paths_failed += 1;
                    flags.partial_timeout = true;
                }
            }
        }
        filtered_attempted |= filter.is_some();

        if contributions.is_empty() {
            return Err(RetrievalError::AllPathsFailed(format!(
                "{} path calls failed or timed out",
                flags.paths_failed
            )));
        }

        if filtered_attempted && filtered_hits == 0 && global_hits > 0 {
            flags.fallback_used = true;
        }

        let mut hits = fusion::fuse(contributions);
        fusion::apply_quality_floor(
            &mut hits,
            self.config.quality_floor_distance,
            self.config.quality_floor_min_keep,
        );
        fusion::rank(&mut hits);

        flags.filtered_used = hits
            .iter()
            .any(|h| h.paths.contains(&RetrievalPath::Filtered));

        self.expand_windows(&mut hits, deadline, &mut flags).await;
        fusion::rank(&mut hits);
        hits.truncate(self.config.max_hits);

        debug!(
            hits = hits.len(),
            paths_failed = flags.paths_failed,
            fallback = flags.fallback_used,
            "retrieval complete"
        );

        Ok(RetrievalOutcome {
            hits,
            flags,
            vector_queries,
        })
    }

    /// Embed every variant concurrently. Individual failures skip that
    /// variant; losing all of them is fatal for the question.
    async fn embed_variants(
        &self,
        variants: &[QueryVariant],
        deadline: Instant,
        flags: &mut RetrievalFlags,
    ) -> Result<Vec<(usize, Vec<f32>)>, RetrievalError> {
        let futures = variants.iter().enumerate().map(|(idx, variant)| {
            let embedder = Arc::clone(&self.embedder);
            let budget = self.clip(deadline);
            async move {
                match timeout(budget, embedder.embed(&variant.text)).await {
                    Ok(Ok(embedding)) => Some((idx, embedding)),
                    Ok(Err(e)) => {
                        warn!(variant = idx, error = %e, "variant embedding failed");
                        None
                    }
                    Err(_) => {
                        warn!(variant = idx, "variant embedding timed out");
                        None
                    }
                }
            }
        });

        let results = join_all(futures).await;
        let embeddings: Vec<(usize, Vec<f32>)> = results.into_iter().flatten().collect();

        if embeddings.is_empty() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "{} variants, zero embeddings",
                variants.len()
            )));
        }
        if embeddings.len() < variants.len() {
            flags.partial_timeout = true;
        }
        Ok(embeddings)
    }

    async fn path_call(
        &self,
        path: RetrievalPath,
        variant: usize,
        embedding: Vec<f32>,
        filter: Option<MetadataFilter>,
        deadline: Instant,
    ) -> PathOutcome {
        let top_k = match path {
            RetrievalPath::Filtered => self.config.top_k_filtered,
            _ => self.config.top_k_global,
        }
        .min(self.config.top_k_ceiling);

        let request = VectorQuery {
            embedding,
            top_k,
            filter,
        };

        match timeout(self.clip(deadline), self.vector.query(request)).await {
            Ok(Ok(matches)) => PathOutcome::Produced(Contribution {
                path,
                variant,
                matches,
            }),
            Ok(Err(e)) => {
                warn!(%path, variant, error = %e, "retrieval path failed");
                PathOutcome::Failed
            }
            Err(_) => {
                warn!(%path, variant, "retrieval path timed out");
                PathOutcome::TimedOut
            }
        }
    }

    /// Fetch neighbor sentences around the top-ranked direct hits and
    /// merge them into the hit set tagged as expansion results.
    async fn expand_windows(
        &self,
        hits: &mut Vec<RetrievalHit>,
        deadline: Instant,
        flags: &mut RetrievalFlags,
    ) {
        let radius = self.config.window_radius;
        let targets: Vec<(finsight_core::HitKey, f32, u32, u32)> = hits
            .iter()
            .filter(|h| h.is_direct())
            .take(self.config.expand_top_n)
            .map(|h| {
                let start = h.key.sentence_index.saturating_sub(radius);
                let end = (h.key.sentence_index + radius).min(h.section_len.saturating_sub(1));
                (h.key.clone(), h.distance, start, end)
            })
            .collect();

        let futures = targets
            .iter()
            .map(|(key, _, start, end)| {
                let store = Arc::clone(&self.sentences);
                let budget = self.clip(deadline);
                let (doc, section) = (key.document_id.clone(), key.section_id.clone());
                let (start, end) = (*start, *end);
                async move {
                    match timeout(budget, store.fetch_range(&doc, &section, start, end)).await {
                        Ok(Ok(records)) => ExpansionOutcome::Produced(records),
                        Ok(Err(e)) => {
                            warn!(error = %e, "window expansion fetch failed");
                            ExpansionOutcome::Failed
                        }
                        Err(_) => {
                            warn!("window expansion fetch timed out");
                            ExpansionOutcome::TimedOut
                        }
                    }
                }
            })
            .collect::<Vec<_>>();

        let fetched = join_all(futures).await;

        for ((parent_key, parent_distance, _, _), outcome) in targets.into_iter().zip(fetched) {
            let records = match outcome {
                ExpansionOutcome::Produced(records) => records,
                ExpansionOutcome::Failed => {
                    flags.paths_failed += 1;
                    continue;
                }
                ExpansionOutcome::TimedOut => {
                    flags.paths_failed += 1;
                    flags.partial_timeout = true;
                    continue;
                }
            };
            let parent_variants = hits
                .iter()
                .find(|h| h.key == parent_key)
                .map(|h| h.variants.clone())
                .unwrap_or_default();

            for record in records {
                let key = finsight_core::HitKey {
                    document_id: record.document_id,
                    section_id: record.section_id,
                    sentence_index: record.sentence_index,
                };
                if let Some(existing) = hits.iter_mut().find(|h| h.key == key) {
                    // Neighbor already retrieved directly; keep its own
                    // distance if better, just record the tag.
                    existing.distance = existing.distance.min(parent_distance);
                    existing.paths.insert(RetrievalPath::WindowExpansion);
                    if existing.text.is_empty() {
                        existing.text = record.text;
                    }
                } else {
                    hits.push(RetrievalHit {
                        key,
                        fiscal_year: record.fiscal_year,
                        section_len: record.section_len,
                        distance: parent_distance,
                        text: record.text,
                        paths: [RetrievalPath::WindowExpansion].into(),
                        variants: parent_variants.clone(),
                    });
                }
            }
        }
    }

    /// Clip the per-call timeout to the remaining question deadline.
    fn clip(&self, deadline: Instant) -> Duration {
        self.config
            .call_timeout
            .min(deadline.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finsight_core::{SentenceRecord, ServiceError, VectorMatch};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    fn variants() -> Vec<QueryVariant> {
        vec![QueryVariant::original("What was revenue growth?")]
    }

    fn entity() -> ResolvedEntity {
        ResolvedEntity {
            cik: 1_045_810,
            name: "NVIDIA CORP".into(),
            confidence: 1.0,
            method: finsight_core::MatchMethod::Exact,
        }
    }

    struct OkEmbedder;

    #[async_trait]
    impl Embedder for OkEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
            Err(ServiceError::Network("embedding service down".into()))
        }
    }

    /// Serves distinct results for filtered and global queries.
    struct SplitVector {
        filtered: Vec<VectorMatch>,
        global: Vec<VectorMatch>,
        filtered_calls: AtomicU32,
    }

    impl SplitVector {
        fn new(filtered: Vec<VectorMatch>, global: Vec<VectorMatch>) -> Self {
            Self {
                filtered,
                global,
                filtered_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl VectorSearch for SplitVector {
        async fn query(&self, request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
            if request.filter.is_some() {
                self.filtered_calls.fetch_add(1, Ordering::SeqCst);
                Ok(self.filtered.clone())
            } else {
                Ok(self.global.clone())
            }
        }
    }

    /// Filtered path errors; global path serves.
    struct FilteredFailsVector {
        global: Vec<VectorMatch>,
    }

    #[async_trait]
    impl VectorSearch for FilteredFailsVector {
        async fn query(&self, request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
            if request.filter.is_some() {
                Err(ServiceError::ApiError {
                    status_code: 500,
                    message: "index shard unavailable".into(),
                })
            } else {
                Ok(self.global.clone())
            }
        }
    }

    struct FailingVector;

    #[async_trait]
    impl VectorSearch for FailingVector {
        async fn query(&self, _request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
            Err(ServiceError::Network("connection refused".into()))
        }
    }

    struct HangingVector;

    #[async_trait]
    impl VectorSearch for HangingVector {
        async fn query(&self, _request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    /// Filtered path hangs past the call timeout; global path serves.
    struct FilteredHangsVector {
        global: Vec<VectorMatch>,
    }

    #[async_trait]
    impl VectorSearch for FilteredHangsVector {
        async fn query(&self, request: VectorQuery) -> Result<Vec<VectorMatch>, ServiceError> {
            if request.filter.is_some() {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!()
            }
            Ok(self.global.clone())
        }
    }

    struct HangingSentences;

    #[async_trait]
    impl SentenceStore for HangingSentences {
        async fn fetch_range(
            &self,
            _document_id: &str,
            _section_id: &str,
            _start: u32,
            _end: u32,
        ) -> Result<Vec<SentenceRecord>, ServiceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    struct EmptySentences;

    #[async_trait]
    impl SentenceStore for EmptySentences {
        async fn fetch_range(
            &self,
            _document_id: &str,
            _section_id: &str,
            _start: u32,
            _end: u32,
        ) -> Result<Vec<SentenceRecord>, ServiceError> {
            Ok(Vec::new())
        }
    }

    /// Serves the full requested range for a fixed section.
    struct RangeSentences {
        fiscal_year: i32,
        section_len: u32,
    }

    #[async_trait]
    impl SentenceStore for RangeSentences {
        async fn fetch_range(
            &self,
            document_id: &str,
            section_id: &str,
            start: u32,
            end: u32,
        ) -> Result<Vec<SentenceRecord>, ServiceError> {
            Ok((start..=end)
                .map(|i| SentenceRecord {
                    document_id: document_id.into(),
                    section_id: section_id.into(),
                    sentence_index: i,
                    fiscal_year: self.fiscal_year,
                    section_len: self.section_len,
                    text: format!("neighbor sentence {i}"),
                })
                .collect())
        }
    }

    fn vm(doc: &str, idx: u32, distance: f32) -> VectorMatch {
        VectorMatch {
            document_id: doc.into(),
            section_id: "1A".into(),
            sentence_index: idx,
            fiscal_year: 2020,
            section_len: 40,
            distance,
            text: format!("sentence {idx}"),
        }
    }

    fn orchestrator(
        vector: Arc<dyn VectorSearch>,
        config: RetrievalConfig,
    ) -> RetrievalOrchestrator {
        RetrievalOrchestrator::new(vector, Arc::new(OkEmbedder), Arc::new(EmptySentences), config)
    }

    #[tokio::test]
    async fn filtered_and_global_fuse() {
        let vector = Arc::new(SplitVector::new(
            vec![vm("doc1", 5, 0.3)],
            vec![vm("doc1", 5, 0.4), vm("doc2", 9, 0.5)],
        ));
        let orch = orchestrator(vector.clone(), RetrievalConfig::default());
        let outcome = orch
            .retrieve(&variants(), &[entity()], &YearHints::default(), deadline())
            .await
            .unwrap();

        assert_eq!(outcome.hits.len(), 2);
        assert!(outcome.flags.filtered_used);
        assert!(!outcome.flags.fallback_used);
        assert_eq!(vector.filtered_calls.load(Ordering::SeqCst), 1);
        let fused = &outcome.hits[0];
        assert_eq!(fused.key.document_id, "doc1");
        assert_eq!(fused.distance, 0.3);
        assert!(fused.paths.contains(&RetrievalPath::Filtered));
        assert!(fused.paths.contains(&RetrievalPath::Global));
    }

    #[tokio::test]
    async fn no_entities_means_no_filtered_path() {
        let vector = Arc::new(SplitVector::new(vec![vm("x", 1, 0.1)], vec![vm("g", 2, 0.5)]));
        let orch = orchestrator(vector.clone(), RetrievalConfig::default());
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();

        assert_eq!(vector.filtered_calls.load(Ordering::SeqCst), 0);
        assert!(!outcome.flags.filtered_used);
        assert!(!outcome.flags.fallback_used);
        assert_eq!(outcome.hits.len(), 1);
    }

    #[tokio::test]
    async fn empty_filtered_with_productive_global_sets_fallback() {
        let vector = Arc::new(SplitVector::new(
            Vec::new(),
            (0..5).map(|i| vm("g", i, 0.4 + i as f32 * 0.01)).collect(),
        ));
        let orch = orchestrator(vector, RetrievalConfig::default());
        let outcome = orch
            .retrieve(&variants(), &[entity()], &YearHints::default(), deadline())
            .await
            .unwrap();

        assert_eq!(outcome.hits.len(), 5);
        assert!(outcome.flags.fallback_used);
        assert!(!outcome.flags.filtered_used);
        assert_eq!(outcome.flags.paths_failed, 0);
    }

    #[tokio::test]
    async fn failed_filtered_path_degrades_with_flags() {
        let vector = Arc::new(FilteredFailsVector {
            global: vec![vm("g", 3, 0.4)],
        });
        let orch = orchestrator(vector, RetrievalConfig::default());
        let outcome = orch
            .retrieve(&variants(), &[entity()], &YearHints::default(), deadline())
            .await
            .unwrap();

        assert_eq!(outcome.hits.len(), 1);
        assert!(outcome.flags.fallback_used);
        assert_eq!(outcome.flags.paths_failed, 1);
    }

    #[tokio::test]
    async fn hanging_filtered_path_yields_partial_results() {
        let config = RetrievalConfig {
            call_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let orch = orchestrator(
            Arc::new(FilteredHangsVector {
                global: vec![vm("g", 3, 0.4)],
            }),
            config,
        );
        let outcome = orch
            .retrieve(&variants(), &[entity()], &YearHints::default(), deadline())
            .await
            .unwrap();

        // The surviving path's hits are used; the timeout is flagged.
        assert_eq!(outcome.hits.len(), 1);
        assert!(outcome.flags.partial_timeout);
        assert!(outcome.flags.fallback_used);
        assert_eq!(outcome.flags.paths_failed, 1);
    }

    #[tokio::test]
    async fn all_paths_failing_is_an_error() {
        let orch = orchestrator(Arc::new(FailingVector), RetrievalConfig::default());
        let err = orch
            .retrieve(&variants(), &[entity()], &YearHints::default(), deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::AllPathsFailed(_)));
    }

    #[tokio::test]
    async fn hanging_vector_times_out_as_all_paths_failed() {
        let config = RetrievalConfig {
            call_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let orch = orchestrator(Arc::new(HangingVector), config);
        let err = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::AllPathsFailed(_)));
    }

    #[tokio::test]
    async fn all_embeddings_failing_is_an_error() {
        let orch = RetrievalOrchestrator::new(
            Arc::new(SplitVector::new(Vec::new(), Vec::new())),
            Arc::new(FailingEmbedder),
            Arc::new(EmptySentences),
            RetrievalConfig::default(),
        );
        let err = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::EmbeddingFailed(_)));
    }

    #[tokio::test]
    async fn empty_results_are_not_an_error() {
        let orch = orchestrator(
            Arc::new(SplitVector::new(Vec::new(), Vec::new())),
            RetrievalConfig::default(),
        );
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();
        assert!(outcome.hits.is_empty());
        assert_eq!(outcome.flags.paths_failed, 0);
    }

    #[tokio::test]
    async fn window_expansion_adds_tagged_neighbors() {
        let orch = RetrievalOrchestrator::new(
            Arc::new(SplitVector::new(Vec::new(), vec![vm("doc1", 10, 0.3)])),
            Arc::new(OkEmbedder),
            Arc::new(RangeSentences {
                fiscal_year: 2020,
                section_len: 40,
            }),
            RetrievalConfig::default(),
        );
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();

        // Core hit plus 6 neighbors (radius 3 both sides).
        assert_eq!(outcome.hits.len(), 7);
        let core = outcome
            .hits
            .iter()
            .find(|h| h.key.sentence_index == 10)
            .unwrap();
        assert!(core.is_direct());
        let neighbors: Vec<_> = outcome.hits.iter().filter(|h| !h.is_direct()).collect();
        assert_eq!(neighbors.len(), 6);
        for n in neighbors {
            assert_eq!(n.distance, core.distance);
            assert!(n.paths.contains(&RetrievalPath::WindowExpansion));
            // Equal distance: the direct hit must still rank first.
            let core_pos = outcome
                .hits
                .iter()
                .position(|h| h.key.sentence_index == 10)
                .unwrap();
            let n_pos = outcome
                .hits
                .iter()
                .position(|h| h.key == n.key)
                .unwrap();
            assert!(core_pos < n_pos);
        }
    }

    #[tokio::test]
    async fn expansion_clamps_to_section_bounds() {
        let orch = RetrievalOrchestrator::new(
            Arc::new(SplitVector::new(
                Vec::new(),
                vec![VectorMatch {
                    section_len: 3,
                    ..vm("doc1", 1, 0.3)
                }],
            )),
            Arc::new(OkEmbedder),
            Arc::new(RangeSentences {
                fiscal_year: 2020,
                section_len: 3,
            }),
            RetrievalConfig::default(),
        );
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();

        // Section has indices 0..=2 only.
        assert_eq!(outcome.hits.len(), 3);
        assert!(outcome.hits.iter().all(|h| h.key.sentence_index <= 2));
    }

    #[tokio::test]
    async fn hanging_neighbor_fetch_flags_partial_timeout() {
        let config = RetrievalConfig {
            call_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let orch = RetrievalOrchestrator::new(
            Arc::new(SplitVector::new(Vec::new(), vec![vm("doc1", 10, 0.3)])),
            Arc::new(OkEmbedder),
            Arc::new(HangingSentences),
            config,
        );
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();

        // The direct hit survives without neighbors.
        assert_eq!(outcome.hits.len(), 1);
        assert!(outcome.flags.partial_timeout);
        assert_eq!(outcome.flags.paths_failed, 1);
    }

    #[tokio::test]
    async fn max_hits_budget_is_enforced() {
        let many: Vec<VectorMatch> = (0..30).map(|i| vm("g", i, 0.2 + i as f32 * 0.001)).collect();
        let config = RetrievalConfig {
            max_hits: 10,
            expand_top_n: 0,
            ..Default::default()
        };
        let orch = orchestrator(Arc::new(SplitVector::new(Vec::new(), many)), config);
        let outcome = orch
            .retrieve(&variants(), &[], &YearHints::default(), deadline())
            .await
            .unwrap();
        assert_eq!(outcome.hits.len(), 10);
    }
}
