// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{RagError, Result};
use crate::llm::ApiKey;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::from(file).required(path.is_some()))
            // Override with environment variables (prefix: TWINRAG_, nested with __)
            .add_source(
                Environment::with_prefix("TWINRAG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let mut app: AppConfig = config
            .try_deserialize()
            .map_err(|e| RagError::Config(e.to_string()))?;

        // The conventional Groq variable is honoured when nothing else set a key
        if app.llm.api_key.is_none() {
            app.llm.api_key = std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(ApiKey::new);
        }

        Ok(app)
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".twinrag")
            .join("config.toml")
    }

    /// Render the default configuration as TOML, as a starting point for a config file.
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml()
    }

    /// Render as TOML with secrets replaced by a placeholder.
    pub fn to_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        for key in [&mut shown.llm.api_key, &mut shown.vector.token] {
            if key.is_some() {
                *key = Some(ApiKey::new("[REDACTED]"));
            }
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| RagError::Internal(format!("Failed to render config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_to_toml_redacts_secrets() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some(ApiKey::new("gsk_secret"));
        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.monitoring.cache_max_size, 100);
        assert_eq!(config.monitoring.cache_ttl_seconds, 3600);
        assert_eq!(config.monitoring.query_timeout_ms, 15_000);
        assert_eq!(config.vector.provider, VectorProvider::Mock);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[monitoring]\ncache_max_size = 7\nquery_timeout_ms = 500\n\n[vector]\ntop_k = 3"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.monitoring.cache_max_size, 7);
        assert_eq!(config.monitoring.query_timeout_ms, 500);
        assert_eq!(config.vector.top_k, 3);
        // Untouched sections keep their defaults
        assert_eq!(config.monitoring.cache_ttl_seconds, 3600);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/twinrag.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_toml_round_trips() {
        let rendered = AppConfig::default_toml().unwrap();
        assert!(rendered.contains("[monitoring]"));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.monitoring.max_metrics_history, 1000);
    }
}
