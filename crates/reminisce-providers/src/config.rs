//! Generator configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use reminisce_core::session::DEFAULT_QUIZ_LEN;
use reminisce_core::traits::QuestionGenerator;

use crate::azure::AzureOpenAiGenerator;
use crate::openai::OpenAiGenerator;

/// Configuration for a question-generation backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeneratorConfig {
    Azure {
        endpoint: String,
        api_key: String,
        deployment: String,
        #[serde(default)]
        api_version: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorConfig::Azure {
                endpoint,
                api_key: _,
                deployment,
                api_version,
            } => f
                .debug_struct("Azure")
                .field("endpoint", endpoint)
                .field("api_key", &"***")
                .field("deployment", deployment)
                .field("api_version", api_version)
                .finish(),
            GeneratorConfig::OpenAI {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// Top-level reminisce configuration.
///
/// A missing `[generator]` section means quizzes run entirely on the
/// deterministic fallback drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminisceConfig {
    /// Question-generation backend, if any.
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
    /// Default question count per quiz.
    #[serde(default = "default_quiz_len")]
    pub default_quiz_len: usize,
    /// Whether sensitive knowledge items may appear in quizzes.
    #[serde(default)]
    pub include_sensitive: bool,
    /// Path of the state snapshot file.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_quiz_len() -> usize {
    DEFAULT_QUIZ_LEN
}
fn default_state_path() -> PathBuf {
    PathBuf::from("./reminisce-state.json")
}

impl Default for ReminisceConfig {
    fn default() -> Self {
        Self {
            generator: None,
            default_quiz_len: default_quiz_len(),
            include_sensitive: false,
            state_path: default_state_path(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_generator_config(config: &GeneratorConfig) -> GeneratorConfig {
    match config {
        GeneratorConfig::Azure {
            endpoint,
            api_key,
            deployment,
            api_version,
        } => GeneratorConfig::Azure {
            endpoint: resolve_env_vars(endpoint),
            api_key: resolve_env_vars(api_key),
            deployment: resolve_env_vars(deployment),
            api_version: api_version.clone(),
        },
        GeneratorConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => GeneratorConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `reminisce.toml` in the current directory
/// 2. `~/.config/reminisce/config.toml`
///
/// Environment variable overrides: `REMINISCE_AZURE_OPENAI_KEY`,
/// `REMINISCE_OPENAI_KEY`.
pub fn load_config() -> Result<ReminisceConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ReminisceConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("reminisce.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ReminisceConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ReminisceConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("REMINISCE_AZURE_OPENAI_KEY") {
        if let Some(GeneratorConfig::Azure { api_key, .. }) = config.generator.as_mut() {
            *api_key = key;
        }
    }
    if let Ok(key) = std::env::var("REMINISCE_OPENAI_KEY") {
        if let Some(GeneratorConfig::OpenAI { api_key, .. }) = config.generator.as_mut() {
            *api_key = key;
        }
    }

    config.generator = config.generator.as_ref().map(resolve_generator_config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("reminisce"))
}

/// Create a generator instance from its configuration.
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn QuestionGenerator>> {
    match config {
        GeneratorConfig::Azure {
            endpoint,
            api_key,
            deployment,
            api_version,
        } => Ok(Box::new(AzureOpenAiGenerator::new(
            endpoint,
            api_key,
            deployment,
            api_version.clone(),
        ))),
        GeneratorConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => Ok(Box::new(OpenAiGenerator::new(
            api_key,
            base_url.clone(),
            model.clone(),
        ))),
    }
}
