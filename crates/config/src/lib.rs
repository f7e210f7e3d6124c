//! Configuration loading and validation for FinSight.
//!
//! Loads `finsight.toml` with environment variable overrides for
//! secrets, validates all settings at startup, and redacts the API key
//! from Debug output. Every knob has a serde default so a missing file
//! yields a fully usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure. Maps directly to `finsight.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the consumed services. Usually supplied via the
    /// `FINSIGHT_API_KEY` environment variable rather than the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Service endpoints and models.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Local data files (company table, KPI table).
    #[serde(default)]
    pub data: DataConfig,

    /// Entity resolution knobs.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Variant generation knobs.
    #[serde(default)]
    pub planner: PlannerSettings,

    /// Retrieval fan-out knobs.
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Context assembly knobs.
    #[serde(default)]
    pub assembler: AssemblerSettings,

    /// Grounding validation knobs.
    #[serde(default)]
    pub grounding: GroundingSettings,

    /// Pipeline-level limits.
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Endpoints, models and timeouts for the consumed services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Vector index base URL.
    pub vector_url: String,

    /// Embedding service base URL (OpenAI-compatible).
    pub embedding_url: String,

    /// Embedding model name.
    pub embedding_model: String,

    /// Generation service base URL (OpenAI-compatible).
    pub generation_url: String,

    /// Generation model name.
    pub generation_model: String,

    /// Sentence metadata service base URL.
    pub sentence_url: String,

    /// HTTP client timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            vector_url: "http://localhost:8100".into(),
            embedding_url: "https://api.openai.com/v1".into(),
            embedding_model: "text-embedding-3-small".into(),
            generation_url: "https://api.openai.com/v1".into(),
            generation_model: "gpt-4o-mini".into(),
            sentence_url: "http://localhost:8101".into(),
            timeout_secs: 60,
        }
    }
}

/// Paths to the pre-built local tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON array of company records (CIK, name, ticker, aliases).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_table: Option<PathBuf>,

    /// JSON array of KPI facts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Acceptance threshold for the fuzzy company-match tier.
    pub fuzzy_threshold: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Maximum rephrased variants kept per generation call.
    pub max_variants: usize,

    /// Rephrasings shorter than this are discarded.
    pub min_variant_len: usize,

    /// Questions shorter than this skip variant generation.
    pub min_query_len: usize,

    /// Per-call timeout in seconds.
    pub call_timeout_secs: u64,

    /// Sampling temperature for rephrase and decompose calls.
    pub temperature: f32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_variants: 3,
            min_variant_len: 10,
            min_query_len: 12,
            call_timeout_secs: 10,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k_filtered: usize,
    pub top_k_global: usize,

    /// Hard candidate ceiling imposed by the vector service.
    pub top_k_ceiling: usize,

    /// Per-call timeout in seconds for embedding and vector queries.
    pub call_timeout_secs: u64,

    /// Quality floor distance; hits beyond it are dropped when enough
    /// closer hits survive.
    pub quality_floor_distance: f32,
    pub quality_floor_min_keep: usize,

    /// Neighbor radius for window expansion.
    pub window_radius: u32,

    /// How many top direct hits get window expansion.
    pub expand_top_n: usize,

    /// Total hit budget after expansion.
    pub max_hits: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k_filtered: 10,
            top_k_global: 10,
            top_k_ceiling: 50,
            call_timeout_secs: 10,
            quality_floor_distance: 1.2,
            quality_floor_min_keep: 3,
            window_radius: 3,
            expand_top_n: 5,
            max_hits: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerSettings {
    /// Sentences on each side of an anchor hit.
    pub window_radius: u32,

    /// Whole-window budget for the prompt.
    pub max_windows: usize,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            window_radius: 3,
            max_windows: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingSettings {
    /// Minimum content-word overlap for uncited claims.
    pub overlap_threshold: f32,
}

impl Default for GroundingSettings {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Per-question deadline in seconds; the fan-out is clipped to it
    /// and partial results are used past it.
    pub deadline_secs: u64,

    /// Timeout for one synthesis call, in seconds.
    pub synthesis_timeout_secs: u64,

    /// Max tokens for the synthesized answer.
    pub synthesis_max_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            deadline_secs: 60,
            synthesis_timeout_secs: 30,
            synthesis_max_tokens: 1024,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "api_key",
                &self.api_key.as_deref().map(|_| "[REDACTED]"),
            )
            .field("services", &self.services)
            .field("data", &self.data)
            .field("resolver", &self.resolver)
            .field("planner", &self.planner)
            .field("retrieval", &self.retrieval)
            .field("assembler", &self.assembler)
            .field("grounding", &self.grounding)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            services: ServicesConfig::default(),
            data: DataConfig::default(),
            resolver: ResolverConfig::default(),
            planner: PlannerSettings::default(),
            retrieval: RetrievalSettings::default(),
            assembler: AssemblerSettings::default(),
            grounding: GroundingSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from `finsight.toml` in the working directory, then apply
    /// environment overrides (`FINSIGHT_API_KEY` wins over the file).
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("finsight.toml"))?;

        if let Ok(key) = std::env::var("FINSIGHT_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("FINSIGHT_GENERATION_MODEL") {
            config.services.generation_model = model;
        }

        Ok(config)
    }

    /// Load from a specific file path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.resolver.fuzzy_threshold) {
            return Err(ConfigError::ValidationError(
                "resolver.fuzzy_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.grounding.overlap_threshold) {
            return Err(ConfigError::ValidationError(
                "grounding.overlap_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.retrieval.top_k_filtered > self.retrieval.top_k_ceiling
            || self.retrieval.top_k_global > self.retrieval.top_k_ceiling
        {
            return Err(ConfigError::ValidationError(
                "retrieval top_k values must not exceed top_k_ceiling".into(),
            ));
        }
        if self.retrieval.max_hits == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.max_hits must be at least 1".into(),
            ));
        }
        if self.assembler.max_windows == 0 {
            return Err(ConfigError::ValidationError(
                "assembler.max_windows must be at least 1".into(),
            ));
        }
        if self.pipeline.deadline_secs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.deadline_secs must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.planner.temperature) {
            return Err(ConfigError::ValidationError(
                "planner.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.window_radius, 3);
        assert_eq!(config.planner.max_variants, 3);
        assert!(!config.has_api_key());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.retrieval.top_k_global, config.retrieval.top_k_global);
        assert_eq!(parsed.services.generation_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[retrieval]\ntop_k_global = 25\n\n[grounding]\noverlap_threshold = 0.4\n"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.retrieval.top_k_global, 25);
        assert_eq!(config.grounding.overlap_threshold, 0.4);
        // Unspecified sections keep defaults.
        assert_eq!(config.retrieval.top_k_filtered, 10);
        assert_eq!(config.assembler.max_windows, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/finsight.toml")).unwrap();
        assert_eq!(config.planner.min_variant_len, 10);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[grounding]\noverlap_threshold = 1.5\n").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn top_k_above_ceiling_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[retrieval]\ntop_k_global = 500\n").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret-key".into()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-key"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not = [valid").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
