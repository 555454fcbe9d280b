//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod config;
mod connectors;
mod logging;
mod query;

pub use config::{ConfigSubcommand, handle_config_command};
pub use connectors::{ConnectorsSubcommand, handle_connectors_command};
pub use logging::init_logging;
pub use query::{QueryCommand, run_query};
