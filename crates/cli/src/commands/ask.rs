//! `finsight ask` — answer one question end to end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use finsight_assembler::AssemblerConfig;
use finsight_config::AppConfig;
use finsight_core::Query;
use finsight_grounding::GroundingConfig;
use finsight_pipeline::{PipelineConfig, PipelineServices, QueryPipeline};
use finsight_planner::PlannerConfig;
use finsight_providers::{
    HttpEmbedder, HttpGenerator, HttpSentenceStore, HttpVectorSearch, JsonKpiStore,
};
use finsight_resolver::{AliasTable, MetricCatalog};
use finsight_retrieval::RetrievalConfig;

pub async fn run(
    config_path: Option<PathBuf>,
    question: String,
    tickers: Vec<String>,
    years: Vec<i32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    // Check for an API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export FINSIGHT_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to finsight.toml (run `finsight init` to create one).");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let pipeline = build_pipeline(&config)?;

    let query = Query::new(question)
        .with_entity_hints(tickers)
        .with_year_hints(years);
    let response = pipeline.answer(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("\n{}\n", response.answer);

    if !response.citations.is_empty() {
        println!("Sources:");
        for citation in &response.citations {
            println!(
                "  - {} · section {} · sentence {}",
                citation.document_id, citation.section_id, citation.sentence_index
            );
        }
        println!();
    }

    if response.flags.fallback_used {
        println!("note: filtered retrieval found nothing; the answer relies on unfiltered search");
    }
    if response.flags.partial_timeout {
        println!("note: some retrieval calls timed out; the answer uses partial results");
    }

    println!(
        "{} · {} ms · {} LLM calls · {} vector queries · {} tokens · ${:.4}",
        match response.outcome {
            finsight_core::ResponseOutcome::Answered => "answered",
            finsight_core::ResponseOutcome::NoEvidence => "no evidence",
            finsight_core::ResponseOutcome::LowConfidence => "low confidence",
        },
        response.trace.latency_ms,
        response.trace.llm_calls,
        response.trace.vector_queries,
        response.trace.total_tokens,
        response.trace.cost_usd,
    );

    Ok(())
}

/// Wire the HTTP providers and local tables described by the config
/// into a ready pipeline.
pub(crate) fn build_pipeline(
    config: &AppConfig,
) -> Result<QueryPipeline, Box<dyn std::error::Error>> {
    let key = config.api_key.clone().unwrap_or_default();
    let timeout = Duration::from_secs(config.services.timeout_secs);

    let services = PipelineServices {
        vector: Arc::new(HttpVectorSearch::new(
            &config.services.vector_url,
            &key,
            timeout,
        )?),
        embedder: Arc::new(HttpEmbedder::new(
            &config.services.embedding_url,
            &key,
            &config.services.embedding_model,
            timeout,
        )?),
        generator: Arc::new(HttpGenerator::new(
            &config.services.generation_url,
            &key,
            &config.services.generation_model,
            timeout,
        )?),
        sentences: Arc::new(HttpSentenceStore::new(
            &config.services.sentence_url,
            &key,
            timeout,
        )?),
        kpi_store: Arc::new(load_kpi_store(config)?),
    };

    let companies = match &config.data.company_table {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("company table {}: {e}", path.display()))?;
            AliasTable::from_json(&raw)
                .map_err(|e| format!("company table {}: {e}", path.display()))?
        }
        None => {
            warn!("no company table configured, entity resolution is disabled");
            AliasTable::new(Vec::new())
        }
    };

    let pipeline = QueryPipeline::builder(services)
        .companies(companies)
        .metrics(MetricCatalog::default())
        .fuzzy_threshold(config.resolver.fuzzy_threshold)
        .planner_config(PlannerConfig {
            max_variants: config.planner.max_variants,
            min_variant_len: config.planner.min_variant_len,
            min_query_len: config.planner.min_query_len,
            call_timeout: Duration::from_secs(config.planner.call_timeout_secs),
            temperature: config.planner.temperature,
        })
        .retrieval_config(RetrievalConfig {
            top_k_filtered: config.retrieval.top_k_filtered,
            top_k_global: config.retrieval.top_k_global,
            top_k_ceiling: config.retrieval.top_k_ceiling,
            call_timeout: Duration::from_secs(config.retrieval.call_timeout_secs),
            quality_floor_distance: config.retrieval.quality_floor_distance,
            quality_floor_min_keep: config.retrieval.quality_floor_min_keep,
            window_radius: config.retrieval.window_radius,
            expand_top_n: config.retrieval.expand_top_n,
            max_hits: config.retrieval.max_hits,
        })
        .assembler_config(AssemblerConfig {
            window_radius: config.assembler.window_radius,
            max_windows: config.assembler.max_windows,
        })
        .grounding_config(GroundingConfig {
            overlap_threshold: config.grounding.overlap_threshold,
        })
        .pipeline_config(PipelineConfig {
            deadline: Duration::from_secs(config.pipeline.deadline_secs),
            synthesis_timeout: Duration::from_secs(config.pipeline.synthesis_timeout_secs),
            synthesis_max_tokens: config.pipeline.synthesis_max_tokens,
            generation_model: config.services.generation_model.clone(),
            ..Default::default()
        })
        .build();

    Ok(pipeline)
}

fn load_kpi_store(config: &AppConfig) -> Result<JsonKpiStore, Box<dyn std::error::Error>> {
    match &config.data.kpi_table {
        Some(path) => Ok(JsonKpiStore::load(path)?),
        None => {
            warn!("no KPI table configured, structured lookups will find nothing");
            Ok(JsonKpiStore::from_facts(Vec::new()))
        }
    }
}
