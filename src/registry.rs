//! Connector registry
//!
//! Holds one lazily-built connector per data source type. Construction runs
//! at most once per type even when the first requests race; requests for
//! other types never wait on it.

use crate::connector::MetadataConnector;
use crate::dispatcher::panic_message;
use crate::error::{MetadataError, MetadataResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds the connector instance for one type
pub type ConnectorFactory =
    Arc<dyn Fn() -> anyhow::Result<Arc<dyn MetadataConnector>> + Send + Sync>;

type InstanceCell = Arc<OnceCell<Arc<dyn MetadataConnector>>>;

/// Connector registry keyed by data source type id
#[derive(Default)]
pub struct ConnectorRegistry {
    factories: DashMap<String, ConnectorFactory>,
    instances: DashMap<String, InstanceCell>,
}

impl ConnectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a type
    ///
    /// Replacing a factory is allowed until the type has a live instance.
    pub fn register<F>(&self, type_id: impl Into<String>, factory: F) -> MetadataResult<()>
    where
        F: Fn() -> anyhow::Result<Arc<dyn MetadataConnector>> + Send + Sync + 'static,
    {
        let type_id = type_id.into();
        if type_id.trim().is_empty() {
            return Err(MetadataError::Conflict(
                "cannot register a connector with a blank type id".to_string(),
            ));
        }
        if self.is_loaded(&type_id) {
            return Err(MetadataError::Conflict(format!(
                "connector '{}' is already loaded and cannot be replaced",
                type_id
            )));
        }

        tracing::debug!("Registering connector factory: {}", type_id);
        self.factories.insert(type_id, Arc::new(factory));
        Ok(())
    }

    /// Register an already-built connector under its own type id
    ///
    /// Rejected when the type already has an instance slot, including one
    /// whose construction is still in flight.
    pub fn register_instance(&self, connector: Arc<dyn MetadataConnector>) -> MetadataResult<()> {
        let type_id = connector.type_id().to_string();
        if type_id.trim().is_empty() {
            return Err(MetadataError::Conflict(
                "cannot register a connector with a blank type id".to_string(),
            ));
        }

        match self.instances.entry(type_id) {
            Entry::Occupied(entry) => Err(MetadataError::Conflict(format!(
                "connector '{}' already has an instance",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                tracing::debug!("Registering connector instance: {}", entry.key());
                let shared = connector.clone();
                let factory: ConnectorFactory =
                    Arc::new(move || -> anyhow::Result<Arc<dyn MetadataConnector>> {
                        Ok(shared.clone())
                    });
                self.factories.insert(entry.key().clone(), factory);
                entry.insert(Arc::new(OnceCell::new_with(Some(connector))));
                Ok(())
            }
        }
    }

    /// Get the connector for a type, building it on first use
    pub async fn resolve(&self, type_id: &str) -> MetadataResult<Arc<dyn MetadataConnector>> {
        if type_id.trim().is_empty() {
            return Err(MetadataError::ConnectorNotFound {
                type_id: type_id.to_string(),
                reason: "blank type id".to_string(),
            });
        }

        if let Some(connector) = self
            .instances
            .get(type_id)
            .and_then(|cell| cell.get().cloned())
        {
            return Ok(connector);
        }

        let factory = self
            .factories
            .get(type_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MetadataError::not_registered(type_id))?;

        // Shard guard must be released before awaiting on the cell
        let cell = self
            .instances
            .entry(type_id.to_string())
            .or_default()
            .value()
            .clone();

        let connector = cell
            .get_or_try_init(|| async {
                tracing::info!("Loading connector: {}", type_id);
                // Factories may block; keep them off the executor threads
                let built = match tokio::task::spawn_blocking(move || factory()).await {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => Err(anyhow::anyhow!(
                        "connector construction panicked: {}",
                        panic_message(e.into_panic().as_ref())
                    )),
                    Err(e) => Err(anyhow::anyhow!("connector construction aborted: {}", e)),
                };
                built.map_err(|e| {
                    tracing::warn!("Failed to load connector '{}': {:#}", type_id, e);
                    MetadataError::ConnectorNotFound {
                        type_id: type_id.to_string(),
                        reason: format!("failed to load: {:#}", e),
                    }
                })
            })
            .await?;

        Ok(connector.clone())
    }

    /// Check if a factory is registered for a type
    pub fn contains(&self, type_id: &str) -> bool {
        self.factories.contains_key(type_id)
    }

    /// Check if a type has a live instance
    pub fn is_loaded(&self, type_id: &str) -> bool {
        self.instances
            .get(type_id)
            .is_some_and(|cell| cell.initialized())
    }

    /// Registered type ids, sorted
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    /// Number of live instances
    pub fn loaded_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Drop every live instance
    pub fn shutdown(&self) {
        let loaded = self.loaded_count();
        self.instances.clear();
        tracing::info!("Released {} connector instance(s)", loaded);
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("registered", &self.registered_types())
            .field("loaded", &self.loaded_count())
            .finish()
    }
}
