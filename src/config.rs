//! Exploration configuration
//!
//! One serde document with a section per stage. Every field has a default,
//! so an empty file (or no file) is a valid configuration. Files are YAML
//! or JSON, chosen by extension.

use crate::algo::SimilarityMetric;
use crate::explore::BranchingCriterion;
use crate::hypothesis::QualityThresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const ENV_API_KEY: &str = "NOESIS_LLM_API_KEY";
pub const ENV_MODEL: &str = "NOESIS_LLM_MODEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// LLM Provider options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    Ollama,
    OpenAI,
    Anthropic,
    Gemini,
}

impl LLMProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Ollama => "llama3.1:8b",
            LLMProvider::OpenAI => "gpt-4-turbo",
            LLMProvider::Anthropic => "claude-3-5-sonnet-20241022",
            LLMProvider::Gemini => "gemini-2.5-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::Ollama => "http://localhost:11434",
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Anthropic => "https://api.anthropic.com/v1",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

/// Configuration for the generative text service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// The LLM provider to use
    pub provider: LLMProvider,
    /// Model name; empty selects the provider default
    pub model: String,
    /// API Key (required by every provider except Ollama)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API Base URL; `None` selects the provider default
    pub api_base_url: Option<String>,
    /// System prompt for the LLM
    pub system_prompt: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Ollama,
            model: String::new(),
            api_key: None,
            api_base_url: None,
            system_prompt: None,
            timeout_secs: 300,
            max_tokens: 1500,
        }
    }
}

impl LLMConfig {
    pub fn model_name(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Similarity method name
    pub method: String,
    pub top_n: usize,
    pub min_similarity: f64,
    pub cross_domain_only: bool,
    /// Restrict candidates to the neighborhoods of the most central concepts
    pub focus_on_central_concepts: bool,
    pub central_concepts: usize,
    pub per_concept: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            method: SimilarityMetric::Jaccard.to_string(),
            top_n: 30,
            min_similarity: 0.0,
            cross_domain_only: false,
            focus_on_central_concepts: false,
            central_concepts: 20,
            per_concept: 5,
        }
    }
}

impl PredictionConfig {
    pub fn metric(&self) -> ConfigResult<SimilarityMetric> {
        self.method
            .parse()
            .map_err(|e: crate::algo::UnknownMetric| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_hypotheses: usize,
    pub temperature: f64,
    pub thresholds: QualityThresholds,
    /// Generation calls in flight per layer
    pub max_concurrent: usize,
    /// Attempts per candidate (first try plus retries)
    pub max_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_hypotheses: 10,
            temperature: 0.7,
            thresholds: QualityThresholds::default(),
            max_concurrent: 4,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecursionConfig {
    pub max_depth: usize,
    pub branches_per_layer: usize,
    pub hypotheses_per_layer: usize,
    pub branching_criteria: String,
    pub max_concurrent_branches: usize,
}

impl Default for RecursionConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            branches_per_layer: 2,
            hypotheses_per_layer: 10,
            branching_criteria: BranchingCriterion::Diversity.to_string(),
            max_concurrent_branches: 2,
        }
    }
}

impl RecursionConfig {
    pub fn criterion(&self) -> ConfigResult<BranchingCriterion> {
        self.branching_criteria
            .parse()
            .map_err(|e: crate::explore::BranchingError| ConfigError::Invalid(e.to_string()))
    }
}

/// Run-wide limits; `None` means unlimited
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub max_total_hypotheses: Option<usize>,
    pub max_generation_calls: Option<usize>,
    pub time_limit_secs: Option<u64>,
}

/// Complete configuration of an exploration run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub prediction: PredictionConfig,
    pub generation: GenerationConfig,
    pub recursion: RecursionConfig,
    pub budget: BudgetConfig,
    pub llm: LLMConfig,
}

impl ExplorationConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let mut config: ExplorationConfig = match ext.as_deref() {
            Some("json" | "yaml" | "yml") if text.trim().is_empty() => ExplorationConfig::default(),
            Some("json") => {
                serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            other => {
                return Err(ConfigError::Parse(format!(
                    "unsupported config format {:?} (expected .yaml, .yml or .json)",
                    other.unwrap_or("")
                )))
            }
        };
        debug!("Loaded configuration from {:?}", path);

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override LLM credentials from `NOESIS_LLM_API_KEY` / `NOESIS_LLM_MODEL`
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var(ENV_MODEL) {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |msg: String| -> ConfigResult<()> { Err(ConfigError::Invalid(msg)) };

        self.prediction.metric()?;
        self.recursion.criterion()?;

        if self.prediction.top_n == 0 {
            return invalid("prediction.top_n must be at least 1".to_string());
        }
        if !self.prediction.min_similarity.is_finite() {
            return invalid("prediction.min_similarity must be finite".to_string());
        }
        let temperature = self.generation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return invalid(format!("generation.temperature {} is outside [0, 2]", temperature));
        }
        self.generation
            .thresholds
            .validate()
            .map_err(ConfigError::Invalid)?;
        if self.generation.max_concurrent == 0 {
            return invalid("generation.max_concurrent must be at least 1".to_string());
        }
        if self.generation.max_attempts == 0 {
            return invalid("generation.max_attempts must be at least 1".to_string());
        }
        if self.recursion.branches_per_layer == 0 {
            return invalid("recursion.branches_per_layer must be at least 1".to_string());
        }
        if self.recursion.max_concurrent_branches == 0 {
            return invalid("recursion.max_concurrent_branches must be at least 1".to_string());
        }
        if self.llm.timeout_secs == 0 {
            return invalid("llm.timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}
