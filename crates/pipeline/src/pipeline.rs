//! The question answering pipeline.
//!
//! One [`QueryPipeline::answer`] call runs every stage for one
//! question. Stage failures follow a fixed taxonomy: a resolution miss
//! proceeds entity-less, retrieval degradation is flagged on the
//! response, empty evidence short-circuits to `NoEvidence` without a
//! synthesis call, and a grounding failure is retried exactly once
//! before the terminal low-confidence response.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use finsight_assembler::{AssemblerConfig, assemble, render_context};
use finsight_core::{
    Embedder, Error, GenerationRequest, Generator, GroundingVerdict, KpiFact, KpiStore, Query,
    QueryResponse, ResolvedEntity, ResponseOutcome, Result, RetrievalFlags, SentenceStore,
    ServiceError, SynthesisResult, TraceSummary, VectorSearch, YearHints,
};
use finsight_grounding::{GroundingConfig, GroundingValidator, extract_citations, strip_citations};
use finsight_planner::{PlannerConfig, VariantPlanner, classify};
use finsight_resolver::{AliasTable, EntityResolver, MetricCatalog, YearExtractor};
use finsight_retrieval::{RetrievalConfig, RetrievalOrchestrator};
use finsight_telemetry::{PricingTable, QuestionTrace, Span, SpanKind};

use crate::prompt;

/// Pipeline-level knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-question deadline; the retrieval fan-out is clipped to it.
    pub deadline: Duration,

    /// Timeout for one synthesis call.
    pub synthesis_timeout: Duration,

    /// Token budget for the synthesized answer.
    pub synthesis_max_tokens: u32,

    /// Sampling temperature for synthesis. Low, since the answer must
    /// stick to the evidence.
    pub synthesis_temperature: f32,

    /// Generation model name, used for cost estimation.
    pub generation_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(60),
            synthesis_timeout: Duration::from_secs(30),
            synthesis_max_tokens: 1024,
            synthesis_temperature: 0.2,
            generation_model: "gpt-4o-mini".into(),
        }
    }
}

/// The external services the pipeline consumes.
pub struct PipelineServices {
    pub vector: Arc<dyn VectorSearch>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
    pub sentences: Arc<dyn SentenceStore>,
    pub kpi_store: Arc<dyn KpiStore>,
}

/// Builds a [`QueryPipeline`] with defaults for everything but the
/// services.
pub struct PipelineBuilder {
    services: PipelineServices,
    companies: AliasTable,
    metrics: MetricCatalog,
    current_year: Option<i32>,
    fuzzy_threshold: Option<f32>,
    planner_config: PlannerConfig,
    retrieval_config: RetrievalConfig,
    assembler_config: AssemblerConfig,
    grounding_config: GroundingConfig,
    config: PipelineConfig,
    pricing: PricingTable,
}

impl PipelineBuilder {
    fn new(services: PipelineServices) -> Self {
        Self {
            services,
            companies: AliasTable::new(Vec::new()),
            metrics: MetricCatalog::new(Vec::new()),
            current_year: None,
            fuzzy_threshold: None,
            planner_config: PlannerConfig::default(),
            retrieval_config: RetrievalConfig::default(),
            assembler_config: AssemblerConfig::default(),
            grounding_config: GroundingConfig::default(),
            config: PipelineConfig::default(),
            pricing: PricingTable::with_defaults(),
        }
    }

    pub fn companies(mut self, table: AliasTable) -> Self {
        self.companies = table;
        self
    }

    pub fn metrics(mut self, catalog: MetricCatalog) -> Self {
        self.metrics = catalog;
        self
    }

    /// Pin the current-year bound of the year extractor (tests, replay).
    pub fn current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.fuzzy_threshold = Some(threshold);
        self
    }

    pub fn planner_config(mut self, config: PlannerConfig) -> Self {
        self.planner_config = config;
        self
    }

    pub fn retrieval_config(mut self, config: RetrievalConfig) -> Self {
        self.retrieval_config = config;
        self
    }

    pub fn assembler_config(mut self, config: AssemblerConfig) -> Self {
        self.assembler_config = config;
        self
    }

    pub fn grounding_config(mut self, config: GroundingConfig) -> Self {
        self.grounding_config = config;
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn build(self) -> QueryPipeline {
        let mut resolver = EntityResolver::new(self.companies);
        if let Some(threshold) = self.fuzzy_threshold {
            resolver = resolver.with_fuzzy_threshold(threshold);
        }
        let year_extractor = match self.current_year {
            Some(year) => YearExtractor::with_current_year(year),
            None => YearExtractor::new(),
        };
        let planner = VariantPlanner::new(Arc::clone(&self.services.generator), self.planner_config);
        let retrieval = RetrievalOrchestrator::new(
            self.services.vector,
            self.services.embedder,
            self.services.sentences,
            self.retrieval_config,
        );

        QueryPipeline {
            resolver,
            year_extractor,
            metrics: self.metrics,
            planner,
            retrieval,
            generator: self.services.generator,
            kpi_store: self.services.kpi_store,
            validator: GroundingValidator::new(self.grounding_config),
            assembler_config: self.assembler_config,
            pricing: self.pricing,
            config: self.config,
        }
    }
}

/// Answers questions end to end.
pub struct QueryPipeline {
    resolver: EntityResolver,
    year_extractor: YearExtractor,
    metrics: MetricCatalog,
    planner: VariantPlanner,
    retrieval: RetrievalOrchestrator,
    generator: Arc<dyn Generator>,
    kpi_store: Arc<dyn KpiStore>,
    validator: GroundingValidator,
    assembler_config: AssemblerConfig,
    pricing: PricingTable,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn builder(services: PipelineServices) -> PipelineBuilder {
        PipelineBuilder::new(services)
    }

    /// Answer one question. Always returns a response unless retrieval
    /// lost every path with no structured facts to fall back on, or
    /// both synthesis attempts errored outright.
    pub async fn answer(&self, query: &Query) -> Result<QueryResponse> {
        let mut trace = QuestionTrace::new(query.id);
        let deadline = Instant::now() + self.config.deadline;

        let mut span = Span::new(SpanKind::Stage, "resolve");
        let entities = self.resolve_entities(query);
        let years = self.extract_years(query);
        let metric_names = self.metrics.extract(&query.text);
        span.end(true);
        trace.add_span(span);

        if entities.is_empty() {
            debug!("no company resolved, proceeding without a metadata filter");
        }
        if let Some(warning) = &years.warning {
            warn!(%warning, "year extraction warning");
        }

        let query_type = query.query_type.unwrap_or_else(|| {
            classify(
                &query.text,
                entities.len(),
                !metric_names.is_empty(),
                !years.is_empty(),
            )
        });
        debug!(
            %query_type,
            entities = entities.len(),
            years = ?years.years,
            metrics = ?metric_names,
            "query classified"
        );

        let mut span = Span::new(SpanKind::Stage, "plan");
        let variants = self.planner.plan(query, query_type).await;
        span.end(true);
        trace.add_span(span);

        // The KPI supply line runs concurrently with the vector fan-out.
        let mut span = Span::new(SpanKind::Stage, "retrieve");
        let (retrieved, kpi_facts) = tokio::join!(
            self.retrieval.retrieve(&variants, &entities, &years, deadline),
            self.lookup_kpi_facts(&entities, &years, &metric_names),
        );

        let (hits, flags, vector_queries) = match retrieved {
            Ok(outcome) => {
                span.end(true);
                (outcome.hits, outcome.flags, outcome.vector_queries)
            }
            Err(e) if kpi_facts.is_empty() => {
                span.end(false);
                trace.add_span(span);
                return Err(e.into());
            }
            Err(e) => {
                warn!(error = %e, "retrieval lost every path, answering from structured facts");
                span.end(false);
                let flags = RetrievalFlags {
                    paths_failed: variants.len() as u32,
                    ..Default::default()
                };
                (Vec::new(), flags, 0)
            }
        };
        trace.add_span(span);

        if hits.is_empty() && kpi_facts.is_empty() {
            debug!("no evidence from either supply line");
            trace.end();
            return Ok(QueryResponse::no_evidence(
                query.id,
                flags,
                self.summary(&trace, vector_queries),
            ));
        }

        let mut span = Span::new(SpanKind::Stage, "assemble");
        let context = assemble(&hits, kpi_facts, query_type, &self.assembler_config);
        let rendered = render_context(&context);
        span.end(true);
        trace.add_span(span);

        let mut last_verdict: Option<GroundingVerdict> = None;
        let mut last_error: Option<Error> = None;

        for attempt in 0..2u32 {
            let prompt = if attempt == 0 {
                prompt::synthesis_prompt(&query.text, &rendered)
            } else {
                prompt::regeneration_prompt(&query.text, &rendered)
            };

            match self.synthesize(prompt, &mut trace).await {
                Ok(result) => {
                    let verdict = self.validator.validate(&result, &context);
                    if verdict.grounded {
                        trace.end();
                        return Ok(self.answered(query, result, verdict, flags, &trace, vector_queries));
                    }
                    warn!(
                        attempt,
                        failures = verdict.failures(),
                        "answer failed grounding validation"
                    );
                    last_verdict = Some(verdict);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "synthesis call failed");
                    last_error = Some(e);
                }
            }
        }

        trace.end();
        match last_verdict {
            Some(verdict) => Ok(QueryResponse::low_confidence(
                query.id,
                verdict,
                flags,
                self.summary(&trace, vector_queries),
            )),
            None => Err(last_error
                .unwrap_or_else(|| Error::Internal("synthesis produced no result".into()))),
        }
    }

    /// Company mentions from the text plus any caller-supplied hints,
    /// deduplicated by CIK.
    fn resolve_entities(&self, query: &Query) -> Vec<ResolvedEntity> {
        let mut entities = self.resolver.resolve(&query.text);
        for hint in &query.entity_hints {
            for entity in self.resolver.resolve(hint) {
                if !entities.iter().any(|e| e.cik == entity.cik) {
                    entities.push(entity);
                }
            }
        }
        entities
    }

    fn extract_years(&self, query: &Query) -> YearHints {
        let mut hints = self.year_extractor.extract(&query.text);
        for &year in &query.year_hints {
            if !hints.years.contains(&year) {
                hints.years.push(year);
            }
        }
        hints.years.sort_unstable();
        hints
    }

    /// Look up every (entity, year, metric) combination concurrently.
    /// Lookup errors drop that fact and continue.
    async fn lookup_kpi_facts(
        &self,
        entities: &[ResolvedEntity],
        years: &YearHints,
        metrics: &[String],
    ) -> Vec<KpiFact> {
        if entities.is_empty() || years.is_empty() || metrics.is_empty() {
            return Vec::new();
        }

        let mut lookups = Vec::new();
        for entity in entities {
            for &year in &years.years {
                for metric in metrics {
                    let store = Arc::clone(&self.kpi_store);
                    let metric = metric.clone();
                    let cik = entity.cik;
                    lookups.push(async move {
                        match store.lookup(cik, year, &metric).await {
                            Ok(fact) => fact,
                            Err(e) => {
                                warn!(cik, year, %metric, error = %e, "KPI lookup failed");
                                None
                            }
                        }
                    });
                }
            }
        }

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn synthesize(
        &self,
        prompt: String,
        trace: &mut QuestionTrace,
    ) -> Result<SynthesisResult> {
        let request = GenerationRequest {
            system: prompt::SYNTHESIS_SYSTEM.into(),
            prompt,
            temperature: self.config.synthesis_temperature,
            max_tokens: self.config.synthesis_max_tokens,
        };

        let mut span = Span::new(SpanKind::Generation, self.config.generation_model.as_str());
        let response = match timeout(
            self.config.synthesis_timeout,
            self.generator.complete(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                span.end(false);
                trace.add_span(span);
                return Err(e.into());
            }
            Err(_) => {
                span.end(false);
                trace.add_span(span);
                return Err(ServiceError::Timeout("synthesis call timed out".into()).into());
            }
        };

        if let Some(usage) = response.usage {
            let cost = self.pricing.cost(
                &self.config.generation_model,
                usage.input_tokens,
                usage.output_tokens,
            );
            span.record_tokens(usage.input_tokens, usage.output_tokens, cost);
        }
        span.end(true);
        trace.add_span(span);

        let citations = extract_citations(&response.text);
        Ok(SynthesisResult {
            answer: response.text,
            citations,
        })
    }

    fn answered(
        &self,
        query: &Query,
        result: SynthesisResult,
        verdict: GroundingVerdict,
        flags: RetrievalFlags,
        trace: &QuestionTrace,
        vector_queries: u32,
    ) -> QueryResponse {
        let mut seen = HashSet::new();
        let mut citations = result.citations;
        citations.retain(|c| seen.insert(c.clone()));

        QueryResponse {
            question_id: query.id,
            answer: strip_citations(&result.answer),
            citations,
            verdict,
            outcome: ResponseOutcome::Answered,
            flags,
            trace: self.summary(trace, vector_queries),
        }
    }

    /// The trace summary, with the vector-query count taken from the
    /// retrieval outcome rather than from individual spans.
    fn summary(&self, trace: &QuestionTrace, vector_queries: u32) -> TraceSummary {
        let mut summary = trace.summarize();
        summary.vector_queries = vector_queries;
        summary
    }
}
