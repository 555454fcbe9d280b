//! Connector manifest loader
//!
//! Scans the connectors directory and loads manifests with validation and conflict detection.

use super::manifest::ConnectorManifest;
use super::validator::ConnectorValidator;
use super::{PluginError, PluginResult};
use crate::config::paths;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Connector manifest loader
pub struct ConnectorLoader {
    connectors_dir: PathBuf,
}

impl ConnectorLoader {
    /// Create a loader for the default connectors directory
    pub fn new() -> Self {
        Self {
            connectors_dir: paths::connectors_dir(),
        }
    }

    /// Create a loader with a custom connectors directory
    pub fn with_dir(connectors_dir: PathBuf) -> Self {
        Self { connectors_dir }
    }

    pub fn connectors_dir(&self) -> &Path {
        &self.connectors_dir
    }

    /// Load all enabled manifests from the connectors directory
    ///
    /// Files that fail to parse or validate are logged and skipped. Duplicate
    /// names or type ids across the remaining manifests fail the whole load.
    pub fn load_all(&self) -> Result<Vec<ConnectorManifest>> {
        tracing::debug!("Loading connector manifests from: {:?}", self.connectors_dir);

        if !self.connectors_dir.exists() {
            tracing::info!(
                "Connectors directory does not exist: {:?}",
                self.connectors_dir
            );
            return Ok(vec![]);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.connectors_dir)
            .context("Failed to read connectors directory")?
        {
            let path = entry.context("Failed to read directory entry")?.path();
            if !path.is_file() {
                continue;
            }

            let extension = path.extension().and_then(|e| e.to_str());
            if extension == Some("yaml") || extension == Some("yml") {
                paths.push(path);
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let mut manifests = Vec::new();
        let mut skipped = 0usize;

        for path in paths {
            match self.load_manifest(&path) {
                Ok(manifest) if manifest.enabled => {
                    tracing::info!(
                        "Loaded connector manifest: {} (type {})",
                        manifest.name,
                        manifest.type_id
                    );
                    manifests.push(manifest);
                }
                Ok(manifest) => {
                    tracing::info!("Connector manifest {} is disabled", manifest.name);
                }
                Err(e) => {
                    tracing::warn!("Skipping connector manifest {:?}: {:#}", path, e);
                    skipped += 1;
                }
            }
        }

        if !manifests.is_empty() {
            check_conflicts(&manifests)?;
        }

        if skipped > 0 {
            tracing::warn!(
                "Loaded {} connector manifest(s), skipped {}",
                manifests.len(),
                skipped
            );
        } else {
            tracing::debug!("Loaded {} connector manifest(s)", manifests.len());
        }

        Ok(manifests)
    }

    /// Load and validate a single manifest file
    pub fn load_manifest(&self, path: &Path) -> Result<ConnectorManifest> {
        tracing::debug!("Loading connector manifest from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read connector manifest: {:?}", path))?;

        let manifest: ConnectorManifest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse connector manifest YAML: {:?}", path))?;

        ConnectorValidator::validate(&manifest)
            .with_context(|| format!("Connector manifest validation failed: {:?}", path))?;

        Ok(manifest)
    }
}

impl Default for ConnectorLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject duplicate manifest names and duplicate type ids
pub(crate) fn check_conflicts(manifests: &[ConnectorManifest]) -> PluginResult<()> {
    check_duplicates(manifests, "name", |m| m.name.as_str())?;
    check_duplicates(manifests, "type_id", |m| m.type_id.as_str())
}

fn check_duplicates<F>(manifests: &[ConnectorManifest], field: &str, key: F) -> PluginResult<()>
where
    F: Fn(&ConnectorManifest) -> &str,
{
    let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
    for manifest in manifests {
        owners
            .entry(key(manifest))
            .or_default()
            .push(manifest.name.as_str());
    }

    let mut conflicts: Vec<_> = owners
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .collect();

    if conflicts.is_empty() {
        return Ok(());
    }
    conflicts.sort();

    let mut error_msg = format!("Duplicate connector {} detected:\n", field);
    for (value, names) in &conflicts {
        tracing::error!(
            "Connector {} conflict: '{}' declared by {}",
            field,
            value,
            names.join(", ")
        );
        error_msg.push_str(&format!(
            "  - {} '{}' is declared by: {}\n",
            field,
            value,
            names.join(", ")
        ));
    }
    error_msg.push_str("Each connector manifest must have a unique name and type_id.");

    Err(PluginError::Conflict(error_msg))
}
