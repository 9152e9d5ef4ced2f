//! Configuration management for relocate

pub mod logging;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use relocate_core::QuoteStyle;
use relocate_foundation::{ProjectContext, RelocateError, RelocateResult, DEFAULT_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the project root when no explicit config is given
pub const CONFIG_FILE_NAME: &str = ".relocate.toml";

/// Prefix of environment overrides, e.g. `RELOCATE_TRANSFORM__QUOTE=single`
pub const ENV_PREFIX: &str = "RELOCATE_";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for terminals
    #[default]
    Pretty,
    /// Structured JSON, one object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// How project files are found and rewritten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Source extensions without the dot, in probe order
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Gitignore-syntax patterns, relative to the project root
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub quote: QuoteStyle,
    /// Treat `global.require` / `globalThis.require` as module calls
    #[serde(default)]
    pub permissive_require: bool,
    /// Files transformed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Also skip files hidden by `.gitignore`
    #[serde(default)]
    pub respect_gitignore: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: Vec::new(),
            quote: QuoteStyle::Preserve,
            permissive_require: false,
            concurrency: default_concurrency(),
            respect_gitignore: false,
        }
    }
}

impl AppConfig {
    /// Load configuration for a project.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (`RELOCATE_*`, `__` separates sections)
    /// 2. `config_file`, or `<root>/.relocate.toml` if present
    /// 3. Default values
    pub fn load(root: &Path, config_file: Option<&Path>) -> RelocateResult<Self> {
        Self::load_with_env(root, config_file, Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn load_with_env(root: &Path, config_file: Option<&Path>, env: Env) -> RelocateResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(RelocateError::config(format!(
                        "Configuration file {} does not exist",
                        path.display()
                    )));
                }
                tracing::debug!(path = %path.display(), "Loading TOML configuration");
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    tracing::debug!(path = %default_path.display(), "Loading TOML configuration");
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        let config: AppConfig = figment
            .merge(env)
            .extract()
            .map_err(|e| RelocateError::config(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> RelocateResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(RelocateError::config(format!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        if self.transform.extensions.is_empty() {
            return Err(RelocateError::config(
                "At least one source extension must be configured",
            ));
        }

        if self.transform.concurrency == 0 {
            return Err(RelocateError::config("Concurrency cannot be 0"));
        }

        Ok(())
    }

    /// Project context for `root`, resolving user paths against `cwd`
    pub fn project_context(&self, root: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> ProjectContext {
        ProjectContext::new(root)
            .with_cwd(cwd)
            .with_extensions(self.transform.extensions.iter().cloned())
            .with_ignore_patterns(self.transform.ignore_patterns.iter().cloned())
    }
}
