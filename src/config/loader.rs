//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use crate::duration::parse_timeout;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. `config.yaml` in the config directory
    /// 3. Built-in defaults
    ///
    /// `config_dir` overrides the platform config directory.
    pub fn load(config_dir: Option<&Path>) -> Result<Config> {
        let path = Self::config_path(config_dir);

        let config = if path.exists() {
            Self::load_file(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Path of the root config file for an optional directory override
    pub fn config_path(config_dir: Option<&Path>) -> PathBuf {
        match config_dir {
            Some(dir) => dir.join("config.yaml"),
            None => paths::root_config_path(),
        }
    }

    /// Load configuration from a file
    ///
    /// Missing keys fall back to their defaults.
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on:
    /// - Invalid YAML syntax or value types
    /// - An unparsable data-source manager endpoint
    /// - An invalid lookup timeout
    pub fn validate(config_dir: Option<&Path>) -> Result<Config> {
        let config = Self::load(config_dir).context("Failed to load configuration")?;
        Self::check(&config)?;
        Ok(config)
    }

    /// Semantic checks on an already-parsed configuration
    pub fn check(config: &Config) -> Result<()> {
        let resolver = &config.data_source_service;

        url::Url::parse(&resolver.endpoint).with_context(|| {
            format!(
                "dataSourceService.endpoint is not a valid URL: {}",
                resolver.endpoint
            )
        })?;

        Self::resolver_timeout(config)?;

        if let Some(auth) = &resolver.auth {
            let missing = auth.missing_fields();
            if !missing.is_empty() {
                anyhow::bail!("dataSourceService.auth is missing: {}", missing.join(", "));
            }
        }

        if config.default_system.trim().is_empty() {
            anyhow::bail!("defaultSystem cannot be empty");
        }

        Ok(())
    }

    /// Parsed lookup deadline
    pub fn resolver_timeout(config: &Config) -> Result<Duration> {
        parse_timeout(&config.data_source_service.timeout).with_context(|| {
            format!(
                "dataSourceService.timeout is not a valid duration: {}",
                config.data_source_service.timeout
            )
        })
    }

    /// Connector manifest directory, honouring `connectors.dir`
    pub fn connectors_dir(config: &Config, config_dir: Option<&Path>) -> PathBuf {
        match (&config.connectors.dir, config_dir) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(base)) => base.join("connectors"),
            (None, None) => paths::connectors_dir(),
        }
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(endpoint) = std::env::var("METAROUTE_RESOLVER_ENDPOINT") {
            config.data_source_service.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("METAROUTE_RESOLVER_TIMEOUT") {
            config.data_source_service.timeout = timeout;
        }

        if let Ok(dir) = std::env::var("METAROUTE_CONNECTORS_DIR") {
            config.connectors.dir = Some(dir);
        }

        if let Ok(system) = std::env::var("METAROUTE_SYSTEM") {
            config.default_system = system;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config, config_dir: Option<&Path>) -> Result<()> {
        Self::save(config, &Self::config_path(config_dir))
    }
}
