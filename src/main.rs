//! metaroute - resolve a data source and query its metadata from the command line

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::{ConfigSubcommand, ConnectorsSubcommand, QueryCommand};
use metaroute::config::ConfigLoader;
use metaroute::plugins::{ConnectorLoader, register_manifests};
use metaroute::resolver::HttpTransport;
use metaroute::{ConnectorRegistry, DataSourceResolver, MetadataService};
use std::path::PathBuf;
use std::sync::Arc;

/// Route metadata requests to the connector registered for a data source's type
#[derive(Parser, Debug)]
#[command(name = "metaroute", version)]
#[command(about = "Resolve data sources and query their metadata through pluggable connectors", long_about = None)]
struct Args {
    /// Enable debug logging to a temp file
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration directory (overrides METAROUTE_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Query(QueryCommand),

    /// Connector manifest management
    Connectors {
        #[command(subcommand)]
        subcommand: ConnectorsSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let config_dir = args.config_dir.as_deref();

    match args.command {
        Command::Config { subcommand } => cli::handle_config_command(subcommand, config_dir),
        Command::Connectors { subcommand } => {
            let config = ConfigLoader::load(config_dir)?;
            let connectors_dir = ConfigLoader::connectors_dir(&config, config_dir);
            cli::handle_connectors_command(subcommand, &connectors_dir)
        }
        Command::Query(query) => {
            let config = ConfigLoader::validate(config_dir).context("Invalid configuration")?;
            tracing::debug!("Configuration loaded: {:?}", config);

            let transport = HttpTransport::new(
                config.data_source_service.endpoint.clone(),
                config.data_source_service.auth.clone(),
            )?;
            let resolver = DataSourceResolver::new(
                Arc::new(transport),
                ConfigLoader::resolver_timeout(&config)?,
            );

            let registry = Arc::new(ConnectorRegistry::new());
            let connectors_dir = ConfigLoader::connectors_dir(&config, config_dir);
            let manifests = ConnectorLoader::with_dir(connectors_dir).load_all()?;
            register_manifests(&registry, &manifests, &config.connectors.enabled_types)?;

            let service = MetadataService::new(resolver, registry.clone());
            let result = cli::run_query(&service, query, &config.default_system).await;
            registry.shutdown();
            result
        }
    }
}
