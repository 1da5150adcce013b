//! Configuration loading
//!
//! Every value is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`AppConfig`] is handed explicitly to the catalog store and
//! book source constructors.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_TOKENS: u32 = 8192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_CONFIG: &str = "LIVRARIA_CONFIG";
pub const ENV_DATABASE: &str = "LIVRARIA_DATABASE";
pub const ENV_API_KEY: &str = "LIVRARIA_GROQ_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GROQ_API_KEY";
pub const ENV_MODEL: &str = "LIVRARIA_GROQ_MODEL";

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub groq_api_key: Option<String>,
    pub groq_api_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

/// Settings for the external text-generation source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GROQ_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    /// API key, or a configuration error explaining where to set one
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if is_valid_key(key) => Ok(key),
            _ => Err(Error::Config(format!(
                "Groq API key not configured. Please configure using one of:\n\
                 1. Environment: {}=your-key-here (or {})\n\
                 2. TOML config: groq_api_key = \"your-key\"",
                ENV_API_KEY, ENV_API_KEY_FALLBACK
            ))),
        }
    }
}

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub source: SourceConfig,
    pub log_level: String,
}

impl AppConfig {
    /// Resolve configuration from CLI overrides, the process environment and TOML
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        let env = |name: &str| std::env::var(name).ok();
        let toml_config = match config_file_path(cli, &env) {
            Some(path) => load_toml(&path)?,
            None => TomlConfig::default(),
        };
        Ok(Self::resolve(cli, env, toml_config))
    }

    /// Merge the configuration tiers; `env` looks up environment variables
    pub fn resolve<F>(cli: &CliOverrides, env: F, toml_config: TomlConfig) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = cli
            .database_path
            .clone()
            .or_else(|| env(ENV_DATABASE).map(PathBuf::from))
            .or(toml_config.database_path)
            .unwrap_or_else(default_database_path);

        let api_key = env(ENV_API_KEY)
            .filter(|k| is_valid_key(k))
            .or_else(|| env(ENV_API_KEY_FALLBACK).filter(|k| is_valid_key(k)))
            .or(toml_config.groq_api_key.filter(|k| is_valid_key(k)));

        let defaults = SourceConfig::default();
        let source = SourceConfig {
            api_url: toml_config.groq_api_url.unwrap_or(defaults.api_url),
            api_key,
            model: env(ENV_MODEL)
                .or(toml_config.model)
                .unwrap_or(defaults.model),
            temperature: toml_config.temperature.unwrap_or(defaults.temperature),
            max_tokens: toml_config.max_tokens.unwrap_or(defaults.max_tokens),
            timeout_secs: toml_config.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        Self {
            database_path,
            source,
            log_level: toml_config
                .logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read and parse a TOML config file
///
/// A missing file is not an error: defaults are used and a warning logged.
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

fn config_file_path<F>(cli: &CliOverrides, env: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    cli.config_path
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|d| d.join("livraria").join("config.toml")))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("livraria").join("livraria.db"))
        .unwrap_or_else(|| PathBuf::from("./livraria_data/livraria.db"))
}
