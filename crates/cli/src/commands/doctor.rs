//! `finsight doctor` — diagnose configuration and service health.

use std::path::PathBuf;
use std::time::Duration;

use finsight_core::{Embedder, Generator, SentenceStore, ServiceError, VectorSearch};
use finsight_providers::{HttpEmbedder, HttpGenerator, HttpSentenceStore, HttpVectorSearch};

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 FinSight Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0u32;

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue found. Fix the config before running further checks.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — set FINSIGHT_API_KEY or add api_key to finsight.toml");
        issues += 1;
    }

    match &config.data.company_table {
        Some(path) if path.exists() => println!("  ✅ Company table found"),
        Some(path) => {
            println!("  ❌ Company table missing: {}", path.display());
            issues += 1;
        }
        None => {
            println!("  ⚠️  No company table configured — entity resolution disabled");
            issues += 1;
        }
    }

    match &config.data.kpi_table {
        Some(path) if path.exists() => println!("  ✅ KPI table found"),
        Some(path) => {
            println!("  ❌ KPI table missing: {}", path.display());
            issues += 1;
        }
        None => {
            println!("  ⚠️  No KPI table configured — structured lookups disabled");
            issues += 1;
        }
    }

    let key = config.api_key.clone().unwrap_or_default();
    let timeout = Duration::from_secs(config.services.timeout_secs);

    let vector = HttpVectorSearch::new(&config.services.vector_url, &key, timeout)?;
    report("Vector index", vector.health_check().await, &mut issues);

    let embedder = HttpEmbedder::new(
        &config.services.embedding_url,
        &key,
        &config.services.embedding_model,
        timeout,
    )?;
    report("Embedding service", embedder.health_check().await, &mut issues);

    let generator = HttpGenerator::new(
        &config.services.generation_url,
        &key,
        &config.services.generation_model,
        timeout,
    )?;
    report("Generation service", generator.health_check().await, &mut issues);

    let sentences = HttpSentenceStore::new(&config.services.sentence_url, &key, timeout)?;
    report("Sentence store", sentences.health_check().await, &mut issues);

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

fn report(name: &str, outcome: Result<bool, ServiceError>, issues: &mut u32) {
    match outcome {
        Ok(true) => println!("  ✅ {name} reachable"),
        Ok(false) => {
            println!("  ⚠️  {name} responded unhealthy");
            *issues += 1;
        }
        Err(e) => {
            println!("  ❌ {name} unreachable: {e}");
            *issues += 1;
        }
    }
}
