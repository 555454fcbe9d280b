//! Metadata connectors
//!
//! A connector knows how to talk to one kind of data source. The dispatcher
//! only ever sees the [`MetadataConnector`] trait; concrete connectors arrive
//! through the registry, either registered from code or described by a
//! manifest.
//!
//! Built-in connectors:
//! - `file` - JSON catalog on local disk (development and tests)
//! - `http` - remote connector service speaking the operation protocol

mod file;
mod http;
mod operation;

pub use file::FileConnector;
pub use http::HttpConnector;
pub use operation::{Operation, OperationOutput, OperationRequest};

use crate::models::{ConnectionParams, MetaColumnInfo};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Capability interface every connector implements
///
/// One method per [`Operation`]. Errors are opaque to the core; they are
/// wrapped, never interpreted.
#[async_trait]
pub trait MetadataConnector: Send + Sync {
    /// Data source type this connector serves
    fn type_id(&self) -> &str;

    /// Operations this connector declares
    fn capabilities(&self) -> &[Operation] {
        &Operation::ALL
    }

    /// Open (and drop) a connection to verify the parameters
    async fn get_connection(&self, operator: &str, params: &ConnectionParams) -> Result<()>;

    async fn get_databases(&self, creator: &str, params: &ConnectionParams)
    -> Result<Vec<String>>;

    async fn get_tables(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
    ) -> Result<Vec<String>>;

    async fn get_table_props(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<HashMap<String, String>>;

    /// Partitions in whatever shape the connector builds
    async fn get_partitions(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Value>;

    async fn get_columns(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Vec<MetaColumnInfo>>;
}
