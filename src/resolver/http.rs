//! HTTP transport to the data-source manager

use super::protocol::{DsInfoQueryRequest, TransportError};
use super::ResolverTransport;
use crate::auth::{AuthConfig, apply_auth};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Sends lookups as `POST {endpoint}` with a JSON body
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    auth: Option<AuthConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// The overall deadline is enforced by the resolver; the client itself
    /// only bounds connection setup.
    pub fn new(endpoint: impl Into<String>, auth: Option<AuthConfig>) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid data source manager endpoint: {}", endpoint))?;

        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created resolver transport for: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResolverTransport for HttpTransport {
    async fn ask(&self, request: &DsInfoQueryRequest) -> Result<Value, TransportError> {
        tracing::debug!(
            "Asking {} for data source {}",
            self.endpoint,
            request.data_source_id
        );

        let req = self.client.post(&self.endpoint).json(request);
        let req = apply_auth(self.auth.as_ref(), req)
            .map_err(|e| TransportError::Unreachable(format!("{:#}", e)))?;

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
