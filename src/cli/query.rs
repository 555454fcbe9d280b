//! Metadata query commands

use anyhow::{Context, Result};
use clap::Subcommand;
use metaroute::MetadataService;
use metaroute::models::ConnectionParams;
use serde::Serialize;
use serde_json::Value;

/// Metadata queries, printed as pretty JSON
#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// List databases of a data source
    Databases {
        ds_id: String,
        /// Calling system (defaults to config)
        #[arg(long)]
        system: Option<String>,
    },
    /// List tables of a database
    Tables {
        ds_id: String,
        database: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Show table properties
    Props {
        ds_id: String,
        database: String,
        table: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Show the partition layout of a table
    Partitions {
        ds_id: String,
        database: String,
        table: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Show table columns
    Columns {
        ds_id: String,
        database: String,
        table: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Open a connection through a connector type directly
    Connect {
        /// Data source type, e.g. "mysql"
        ds_type: String,
        operator: String,
        /// Connection parameter as key=value (repeatable; values are parsed as JSON when possible)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
}

/// Run a query and print its result
pub async fn run_query(
    service: &MetadataService,
    cmd: QueryCommand,
    default_system: &str,
) -> Result<()> {
    let system = |s: Option<String>| s.unwrap_or_else(|| default_system.to_string());

    match cmd {
        QueryCommand::Databases { ds_id, system: s } => {
            print_json(&service.get_databases_by_ds_id(&ds_id, &system(s)).await?)
        }
        QueryCommand::Tables {
            ds_id,
            database,
            system: s,
        } => print_json(
            &service
                .get_tables_by_ds_id(&ds_id, &database, &system(s))
                .await?,
        ),
        QueryCommand::Props {
            ds_id,
            database,
            table,
            system: s,
        } => print_json(
            &service
                .get_table_props_by_ds_id(&ds_id, &database, &table, &system(s))
                .await?,
        ),
        QueryCommand::Partitions {
            ds_id,
            database,
            table,
            system: s,
        } => print_json(
            &service
                .get_partitions_by_ds_id(&ds_id, &database, &table, &system(s))
                .await?,
        ),
        QueryCommand::Columns {
            ds_id,
            database,
            table,
            system: s,
        } => print_json(
            &service
                .get_columns(&ds_id, &database, &table, &system(s))
                .await?,
        ),
        QueryCommand::Connect {
            ds_type,
            operator,
            params,
        } => {
            let params: ConnectionParams = params.into_iter().collect();
            service.get_connection(&ds_type, &operator, &params).await?;
            print_json(&serde_json::json!({ "connected": true, "type": ds_type }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

/// Parse `key=value`; the value is JSON when it parses as JSON, a string otherwise
fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}
