//! Runtime configuration.
//!
//! Every value has a default, so the tool runs without any config file. A
//! TOML file can override any subset of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PrioritizerError, PrioritizerResult};

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PRIORITIZER_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "prioritizer.toml";

/// Google Tasks REST endpoint
pub const DEFAULT_TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Generative Language REST endpoint
pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prioritizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizerConfig {
    /// Titles of the lists to process, in order
    pub target_lists: Vec<String>,

    /// Service account key file
    pub credentials_path: PathBuf,

    /// Environment variable holding the inference API key
    pub api_key_env: String,

    /// Inference model ID
    pub model: String,

    /// Sampling temperature (0.0 - 1.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,

    /// Pause between successive move calls; 0 disables it
    pub move_delay_ms: u64,

    /// Run subtask suggestion after reordering
    pub suggest_subtasks: bool,

    /// Cap on subtasks created per parent
    pub max_subtasks: usize,

    pub tasks_base_url: String,

    pub inference_base_url: String,
}

impl Default for PrioritizerConfig {
    fn default() -> Self {
        Self {
            target_lists: vec!["Backlog".to_string(), "In Progress".to_string()],
            credentials_path: PathBuf::from("credentials.json"),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: crate::ai::gemini::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_output_tokens: 8192,
            move_delay_ms: 100,
            suggest_subtasks: true,
            max_subtasks: 3,
            tasks_base_url: DEFAULT_TASKS_BASE_URL.to_string(),
            inference_base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
        }
    }
}

impl PrioritizerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> PrioritizerResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PrioritizerError::ConfigError {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &Path) -> PrioritizerResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PrioritizerError::ConfigError {
                reason: format!("cannot read '{}': {e}", path.display()),
            })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config from `PRIORITIZER_CONFIG`, then `./prioritizer.toml`,
    /// then defaults.
    pub fn load() -> PrioritizerResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            tracing::debug!(path = %path, "Loading config from {CONFIG_ENV_VAR}");
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::debug!(path = %local.display(), "Loading local config");
            return Self::from_file(local);
        }

        Ok(Self::default())
    }

    /// Read the inference API key from the configured env var.
    pub fn api_key(&self) -> PrioritizerResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PrioritizerError::MissingApiKey {
                var: self.api_key_env.clone(),
            }),
        }
    }

    fn validate(&self) -> PrioritizerResult<()> {
        if self.target_lists.iter().any(|t| t.trim().is_empty()) {
            return Err(PrioritizerError::ConfigError {
                reason: "target_lists must not contain empty titles".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(PrioritizerError::ConfigError {
                reason: format!("temperature {} is outside 0.0-1.0", self.temperature),
            });
        }
        Ok(())
    }
}
