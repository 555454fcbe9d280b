// Connector manifests
//
// Declares connector types through YAML files so new data source types can be
// wired in without touching the service.

pub mod loader;
pub mod manifest;
pub mod validator;

pub use loader::ConnectorLoader;
pub use manifest::{ConnectorManifest, SourceConfig, SourceType};
pub use validator::ConnectorValidator;

use crate::connector::{FileConnector, HttpConnector, MetadataConnector};
use crate::duration::parse_timeout;
use crate::error::MetadataResult;
use crate::registry::ConnectorRegistry;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Manifest errors
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Connector conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for manifest operations
pub type PluginResult<T> = Result<T, PluginError>;

impl ConnectorManifest {
    /// Build the connector this manifest describes
    pub fn build(&self) -> Result<Arc<dyn MetadataConnector>> {
        let source = &self.source;
        tracing::debug!(
            "Building {} connector '{}' for type {}",
            source.source_type,
            self.name,
            self.type_id
        );

        match source.source_type {
            SourceType::File => {
                let path = source
                    .file_path
                    .as_deref()
                    .context("file connector requires source.file_path")?;
                Ok(Arc::new(FileConnector::new(&self.type_id, path)))
            }
            SourceType::Http => {
                let endpoint = source
                    .endpoint
                    .as_deref()
                    .context("http connector requires source.endpoint")?;
                let timeout = source
                    .timeout
                    .as_deref()
                    .map(parse_timeout)
                    .transpose()
                    .context("Invalid source.timeout")?;

                let mut connector =
                    HttpConnector::new(&self.type_id, endpoint, source.auth.clone(), timeout)?;
                if !source.capabilities.is_empty() {
                    connector = connector.with_capabilities(source.capabilities.clone());
                }
                Ok(Arc::new(connector))
            }
        }
    }
}

/// Register manifest-declared connectors as lazy factories
///
/// `enabled_types` filters by type id; empty means every manifest. Returns
/// the number of connectors registered.
pub fn register_manifests(
    registry: &ConnectorRegistry,
    manifests: &[ConnectorManifest],
    enabled_types: &[String],
) -> MetadataResult<usize> {
    let mut registered = 0;

    for manifest in manifests {
        if !enabled_types.is_empty() && !enabled_types.iter().any(|t| t == &manifest.type_id) {
            tracing::debug!(
                "Connector type {} not enabled, skipping manifest {}",
                manifest.type_id,
                manifest.name
            );
            continue;
        }

        let captured = manifest.clone();
        registry.register(manifest.type_id.clone(), move || captured.build())?;
        registered += 1;
    }

    tracing::info!("Registered {} connector type(s) from manifests", registered);
    Ok(registered)
}
