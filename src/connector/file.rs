//! File catalog connector (for development and testing)

use super::{MetadataConnector, Operation};
use crate::models::{ConnectionParams, MetaColumnInfo};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Connector serving metadata from a local JSON catalog
///
/// The catalog is re-read on every call so edits show up without a restart.
///
/// ```json
/// {
///   "databases": {
///     "sales": {
///       "tables": {
///         "orders": {
///           "props": {"owner": "etl"},
///           "columns": [{"name": "id", "type": "bigint"}],
///           "partitions": {"partKeys": ["ds"], "root": {"partitions": {}}}
///         }
///       }
///     }
///   }
/// }
/// ```
pub struct FileConnector {
    type_id: String,
    file_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    databases: BTreeMap<String, CatalogDatabase>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDatabase {
    #[serde(default)]
    tables: BTreeMap<String, CatalogTable>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogTable {
    #[serde(default)]
    props: HashMap<String, String>,
    #[serde(default)]
    columns: Vec<MetaColumnInfo>,
    #[serde(default)]
    partitions: Value,
}

impl FileConnector {
    /// Create a new file connector
    pub fn new(type_id: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let type_id = type_id.into();

        tracing::debug!("Created file connector '{}' for: {:?}", type_id, file_path);

        Self { type_id, file_path }
    }

    async fn load(&self) -> Result<Catalog> {
        tracing::debug!("Reading catalog from file: {:?}", self.file_path);

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .with_context(|| format!("Failed to read catalog file: {:?}", self.file_path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog JSON: {:?}", self.file_path))
    }

    async fn table(&self, database: &str, table: &str) -> Result<CatalogTable> {
        let mut catalog = self.load().await?;
        let mut db = catalog
            .databases
            .remove(database)
            .with_context(|| format!("Unknown database: {}", database))?;
        db.tables
            .remove(table)
            .with_context(|| format!("Unknown table: {}.{}", database, table))
    }
}

#[async_trait]
impl MetadataConnector for FileConnector {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn capabilities(&self) -> &[Operation] {
        &Operation::ALL
    }

    async fn get_connection(&self, operator: &str, _params: &ConnectionParams) -> Result<()> {
        tracing::debug!("Connection check by {} for: {:?}", operator, self.file_path);

        if !self.file_path.exists() {
            anyhow::bail!("Catalog file does not exist: {:?}", self.file_path);
        }
        self.load().await.map(|_| ())
    }

    async fn get_databases(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
    ) -> Result<Vec<String>> {
        Ok(self.load().await?.databases.into_keys().collect())
    }

    async fn get_tables(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        database: &str,
    ) -> Result<Vec<String>> {
        let mut catalog = self.load().await?;
        let db = catalog
            .databases
            .remove(database)
            .with_context(|| format!("Unknown database: {}", database))?;
        Ok(db.tables.into_keys().collect())
    }

    async fn get_table_props(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<HashMap<String, String>> {
        Ok(self.table(database, table).await?.props)
    }

    async fn get_partitions(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Value> {
        Ok(self.table(database, table).await?.partitions)
    }

    async fn get_columns(
        &self,
        _creator: &str,
        _params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Vec<MetaColumnInfo>> {
        Ok(self.table(database, table).await?.columns)
    }
}
