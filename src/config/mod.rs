//! Configuration system for metaroute
//!
//! Layered configuration: built-in defaults, a root `config.yaml`, then
//! environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, ConnectorsConfig, ResolverConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "dataSourceService.endpoint" => Ok(config.data_source_service.endpoint.clone()),
        "dataSourceService.timeout" => Ok(config.data_source_service.timeout.clone()),
        "connectors.dir" => Ok(config.connectors.dir.clone().unwrap_or_default()),
        "connectors.enabledTypes" => Ok(config.connectors.enabled_types.join(",")),
        "defaultSystem" => Ok(config.default_system.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "dataSourceService.endpoint" => {
            url::Url::parse(value)
                .with_context(|| format!("dataSourceService.endpoint must be a URL: {}", value))?;
            config.data_source_service.endpoint = value.to_string();
        }
        "dataSourceService.timeout" => {
            crate::duration::parse_timeout(value).context(
                "dataSourceService.timeout must be a duration (e.g., '500ms', '10s', '1m')",
            )?;
            config.data_source_service.timeout = value.to_string();
        }
        "connectors.dir" => {
            if value.is_empty() {
                config.connectors.dir = None;
            } else {
                config.connectors.dir = Some(value.to_string());
            }
        }
        "connectors.enabledTypes" => {
            // Comma-separated list; empty enables every manifest
            config.connectors.enabled_types = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "defaultSystem" => {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("defaultSystem cannot be empty"));
            }
            config.default_system = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
