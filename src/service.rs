//! Metadata service
//!
//! Public surface of the crate. Every `*_by_ds_id` call follows the same
//! steps, strictly in order:
//!
//! 1. resolve the data source (errors propagate unchanged)
//! 2. blank type: return the empty default without touching the registry
//! 3. look up the connector and dispatch the operation
//! 4. unpack the output, normalizing partitions
//!
//! `get_connection` is the exception: it takes a type directly, skips
//! resolution and has no blank-type guard.

use crate::connector::{Operation, OperationOutput, OperationRequest};
use crate::dispatcher::OperationDispatcher;
use crate::error::MetadataResult;
use crate::models::{
    ConnectionParams, DataSourceInfo, MetaColumnInfo, MetaPartitionInfo, normalize_partitions,
};
use crate::registry::ConnectorRegistry;
use crate::resolver::DataSourceResolver;
use std::collections::HashMap;
use std::sync::Arc;

/// Service routing metadata requests to connectors
#[derive(Debug, Clone)]
pub struct MetadataService {
    resolver: DataSourceResolver,
    registry: Arc<ConnectorRegistry>,
    dispatcher: OperationDispatcher,
}

impl MetadataService {
    pub fn new(resolver: DataSourceResolver, registry: Arc<ConnectorRegistry>) -> Self {
        Self {
            resolver,
            registry,
            dispatcher: OperationDispatcher::new(),
        }
    }

    /// Get a reference to the connector registry
    pub fn registry(&self) -> &Arc<ConnectorRegistry> {
        &self.registry
    }

    /// Open a connection through the connector for `data_source_type`
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_type = %data_source_type, operation = "getConnection")
    )]
    pub async fn get_connection(
        &self,
        data_source_type: &str,
        operator: &str,
        params: &ConnectionParams,
    ) -> MetadataResult<()> {
        let request = OperationRequest::get_connection(operator, params);
        self.dispatch(data_source_type, request)
            .await?
            .into_connected(data_source_type)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_id = %data_source_id, system = %system, operation = "getDatabases")
    )]
    pub async fn get_databases_by_ds_id(
        &self,
        data_source_id: &str,
        system: &str,
    ) -> MetadataResult<Vec<String>> {
        let Some(info) = self.resolve_typed(data_source_id, system).await? else {
            return Ok(Vec::new());
        };

        let request = OperationRequest::get_databases(&info.creator, &info.params);
        self.dispatch(&info.ds_type, request)
            .await?
            .into_names(&info.ds_type, Operation::GetDatabases)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_id = %data_source_id, system = %system, operation = "getTables")
    )]
    pub async fn get_tables_by_ds_id(
        &self,
        data_source_id: &str,
        database: &str,
        system: &str,
    ) -> MetadataResult<Vec<String>> {
        let Some(info) = self.resolve_typed(data_source_id, system).await? else {
            return Ok(Vec::new());
        };

        let request = OperationRequest::get_tables(&info.creator, &info.params, database);
        self.dispatch(&info.ds_type, request)
            .await?
            .into_names(&info.ds_type, Operation::GetTables)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_id = %data_source_id, system = %system, operation = "getTableProps")
    )]
    pub async fn get_table_props_by_ds_id(
        &self,
        data_source_id: &str,
        database: &str,
        table: &str,
        system: &str,
    ) -> MetadataResult<HashMap<String, String>> {
        let Some(info) = self.resolve_typed(data_source_id, system).await? else {
            return Ok(HashMap::new());
        };

        let request =
            OperationRequest::get_table_props(&info.creator, &info.params, database, table);
        self.dispatch(&info.ds_type, request)
            .await?
            .into_properties(&info.ds_type)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_id = %data_source_id, system = %system, operation = "getPartitions")
    )]
    pub async fn get_partitions_by_ds_id(
        &self,
        data_source_id: &str,
        database: &str,
        table: &str,
        system: &str,
    ) -> MetadataResult<MetaPartitionInfo> {
        let Some(info) = self.resolve_typed(data_source_id, system).await? else {
            return Ok(MetaPartitionInfo::default());
        };

        let request =
            OperationRequest::get_partitions(&info.creator, &info.params, database, table);
        let raw = self
            .dispatch(&info.ds_type, request)
            .await?
            .into_partitions(&info.ds_type)?;
        normalize_partitions(&raw)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(ds_id = %data_source_id, system = %system, operation = "getColumns")
    )]
    pub async fn get_columns(
        &self,
        data_source_id: &str,
        database: &str,
        table: &str,
        system: &str,
    ) -> MetadataResult<Vec<MetaColumnInfo>> {
        let Some(info) = self.resolve_typed(data_source_id, system).await? else {
            return Ok(Vec::new());
        };

        let request =
            OperationRequest::get_columns(&info.creator, &info.params, database, table);
        self.dispatch(&info.ds_type, request)
            .await?
            .into_columns(&info.ds_type)
    }

    /// Resolve, returning `None` when the manager reports a blank type
    async fn resolve_typed(
        &self,
        data_source_id: &str,
        system: &str,
    ) -> MetadataResult<Option<DataSourceInfo>> {
        let info = self.resolver.resolve(data_source_id, system).await?;
        if info.has_blank_type() {
            tracing::debug!(
                "Data source {} has no type, returning empty result",
                data_source_id
            );
            return Ok(None);
        }
        Ok(Some(info))
    }

    async fn dispatch(
        &self,
        ds_type: &str,
        request: OperationRequest,
    ) -> MetadataResult<OperationOutput> {
        let connector = self.registry.resolve(ds_type).await?;
        self.dispatcher.invoke(connector.as_ref(), request).await
    }
}
