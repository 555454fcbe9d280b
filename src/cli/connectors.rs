//! Connector manifest commands

use anyhow::{Context, Result};
use clap::Subcommand;
use metaroute::plugins::ConnectorLoader;
use std::path::{Path, PathBuf};

/// Connector subcommands
#[derive(Subcommand, Debug)]
pub enum ConnectorsSubcommand {
    /// List enabled connector manifests
    List,

    /// Validate a connector manifest file
    Validate {
        /// Path to manifest YAML file
        path: PathBuf,
    },
}

/// Handle connector subcommands
pub fn handle_connectors_command(cmd: ConnectorsSubcommand, connectors_dir: &Path) -> Result<()> {
    tracing::debug!("Handling connectors command: {:?}", cmd);

    let loader = ConnectorLoader::with_dir(connectors_dir.to_path_buf());
    match cmd {
        ConnectorsSubcommand::List => {
            let manifests = loader.load_all()?;

            if manifests.is_empty() {
                println!("No connector manifests found.");
                println!("\nConnectors directory: {}", loader.connectors_dir().display());
                return Ok(());
            }

            println!("Connectors ({}):\n", manifests.len());
            for manifest in manifests {
                println!("  {} (v{})", manifest.name, manifest.version);
                println!("    Type: {}", manifest.type_id);
                println!("    Source: {}", manifest.source.source_type);
                if let Some(desc) = &manifest.description {
                    println!("    Description: {}", desc);
                }
                println!();
            }
        }
        ConnectorsSubcommand::Validate { path } => {
            if !path.exists() {
                anyhow::bail!("Connector manifest not found: {:?}", path);
            }

            let manifest = loader
                .load_manifest(&path)
                .context("Connector manifest validation failed")?;

            println!("✓ Connector manifest is valid");
            println!("  Name: {}", manifest.name);
            println!("  Version: {}", manifest.version);
            println!("  Type: {}", manifest.type_id);
            println!("  Source: {}", manifest.source.source_type);
            println!("  Enabled: {}", manifest.enabled);
        }
    }

    Ok(())
}
