//! Configuration loading, validation, and management for MissionRAG.
//!
//! Loads configuration from `~/.missionrag/config.toml` with environment
//! variable overrides. Validates all settings at startup. Command-line
//! flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.missionrag/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI API key (generation, embeddings, judged metrics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Default answer model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature for answers
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per generated answer
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Vector store settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context assembly settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Quality scoring settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("retrieval", &self.retrieval)
            .field("context", &self.context)
            .field("evaluation", &self.evaluation)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Directory holding the persisted vector collections
    #[serde(default = "default_chroma_dir")]
    pub chroma_dir: PathBuf,

    /// Chroma server URL; when set, queries go over HTTP instead of disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroma_url: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Chunks requested per question
    #[serde(default = "default_n_results")]
    pub n_results: usize,

    /// Model used to embed queries; must match the collection's model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_chroma_dir() -> PathBuf {
    PathBuf::from("./chroma_db_openai")
}
fn default_collection() -> String {
    "nasa_space_missions_text".into()
}
fn default_n_results() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chroma_dir: default_chroma_dir(),
            chroma_url: None,
            collection: default_collection(),
            n_results: default_n_results(),
            embedding_model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Per-chunk character cap before the truncation marker
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Leading characters hashed for duplicate detection
    #[serde(default = "default_signature_chars")]
    pub signature_chars: usize,

    /// Prior turns sent with each question
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_max_chunk_chars() -> usize {
    2000
}
fn default_signature_chars() -> usize {
    200
}
fn default_history_limit() -> usize {
    20
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            signature_chars: default_signature_chars(),
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Judge model for faithfulness and relevancy
    #[serde(default = "default_model")]
    pub evaluator_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Cap on the synthesized BLEU/ROUGE reference
    #[serde(default = "default_reference_max_chars")]
    pub reference_max_chars: usize,

    /// Cap on recorded `<metric>_error` reasons
    #[serde(default = "default_error_reason_max_chars")]
    pub error_reason_max_chars: usize,

    /// Questions generated from each answer for relevancy
    #[serde(default = "default_relevancy_questions")]
    pub relevancy_questions: usize,
}

fn default_reference_max_chars() -> usize {
    1000
}
fn default_error_reason_max_chars() -> usize {
    50
}
fn default_relevancy_questions() -> usize {
    3
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            evaluator_model: default_model(),
            embedding_model: default_embedding_model(),
            reference_max_chars: default_reference_max_chars(),
            error_reason_max_chars: default_error_reason_max_chars(),
            relevancy_questions: default_relevancy_questions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.missionrag/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `MISSIONRAG_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `CHROMA_OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
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

    fn apply_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = ["MISSIONRAG_API_KEY", "OPENAI_API_KEY", "CHROMA_OPENAI_API_KEY"]
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()));
        }

        if let Ok(model) = std::env::var("MISSIONRAG_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".missionrag")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.n_results == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.n_results must be at least 1".into(),
            ));
        }

        if self.context.max_chunk_chars == 0 || self.context.signature_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_chunk_chars and context.signature_chars must be > 0".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
