//! Configuration command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use metaroute::config::{self, ConfigLoader};
use std::path::Path;

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value (all configuration when no key is given)
    Get {
        /// Configuration key (e.g., "defaultSystem", "dataSourceService.timeout")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "defaultSystem", "dataSourceService.timeout")
        key: String,
        /// Configuration value
        value: String,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, config_dir: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(config_dir).context("Failed to load configuration")?;

            if let Some(key) = key {
                println!("{}", config::get_config_value(&config, &key)?);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Only the file layer is persisted, never env overrides
            let path = ConfigLoader::config_path(config_dir);
            let mut config = if path.exists() {
                ConfigLoader::load_file(&path)?
            } else {
                ConfigLoader::load_defaults()
            };

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            ConfigLoader::save(&config, &path).context("Failed to save configuration")?;
            println!("Configuration saved to {}", path.display());
        }
        ConfigSubcommand::Path => {
            println!("{}", ConfigLoader::config_path(config_dir).display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate(config_dir) {
            Ok(_) => println!("Configuration is valid"),
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
