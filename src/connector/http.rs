//! HTTP connector
//!
//! Forwards each operation to a remote connector service as
//! `POST {endpoint}` with body `{"operation": "...", "args": [...]}` and
//! expects `{"success": bool, "result": ..., "error": "..."}` back.

use super::{MetadataConnector, Operation, OperationRequest};
use crate::auth::{AuthConfig, apply_auth};
use crate::models::{ConnectionParams, MetaColumnInfo};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Default request timeout for remote connectors
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connector proxying to a remote connector service
pub struct HttpConnector {
    type_id: String,
    client: reqwest::Client,
    endpoint: String,
    auth: Option<AuthConfig>,
    capabilities: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
struct ConnectorReply {
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpConnector {
    /// Create a new HTTP connector
    pub fn new(
        type_id: impl Into<String>,
        endpoint: impl Into<String>,
        auth: Option<AuthConfig>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        let type_id = type_id.into();

        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created HTTP connector '{}' for: {}", type_id, endpoint);

        Ok(Self {
            type_id,
            client,
            endpoint,
            auth,
            capabilities: Operation::ALL.to_vec(),
        })
    }

    /// Restrict the declared capability set
    pub fn with_capabilities(mut self, capabilities: Vec<Operation>) -> Self {
        self.capabilities = capabilities;
        self
    }

    async fn call<T: DeserializeOwned>(&self, request: OperationRequest) -> Result<T> {
        tracing::debug!("Calling {} on: {}", request.operation, self.endpoint);

        let req = self.client.post(&self.endpoint).json(&request);
        let req = apply_auth(self.auth.as_ref(), req)?;

        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to reach connector at: {}", self.endpoint))?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "Connector request failed: {} (status: {})",
                self.endpoint,
                resp.status()
            );
        }

        let reply: ConnectorReply = resp
            .json()
            .await
            .context("Failed to parse connector reply")?;

        if !reply.success {
            anyhow::bail!(
                "{}",
                reply
                    .error
                    .unwrap_or_else(|| "connector reported failure".to_string())
            );
        }

        serde_json::from_value(reply.result.unwrap_or(Value::Null)).with_context(|| {
            format!(
                "Unexpected result shape for {} from: {}",
                request.operation, self.endpoint
            )
        })
    }
}

#[async_trait]
impl MetadataConnector for HttpConnector {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn capabilities(&self) -> &[Operation] {
        &self.capabilities
    }

    async fn get_connection(&self, operator: &str, params: &ConnectionParams) -> Result<()> {
        let _: Value = self
            .call(OperationRequest::get_connection(operator, params))
            .await?;
        Ok(())
    }

    async fn get_databases(
        &self,
        creator: &str,
        params: &ConnectionParams,
    ) -> Result<Vec<String>> {
        self.call(OperationRequest::get_databases(creator, params))
            .await
    }

    async fn get_tables(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
    ) -> Result<Vec<String>> {
        self.call(OperationRequest::get_tables(creator, params, database))
            .await
    }

    async fn get_table_props(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<HashMap<String, String>> {
        self.call(OperationRequest::get_table_props(
            creator, params, database, table,
        ))
        .await
    }

    async fn get_partitions(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Value> {
        self.call(OperationRequest::get_partitions(
            creator, params, database, table,
        ))
        .await
    }

    async fn get_columns(
        &self,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Vec<MetaColumnInfo>> {
        self.call(OperationRequest::get_columns(creator, params, database, table))
            .await
    }
}
