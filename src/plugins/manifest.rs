//! Connector manifest schema
//!
//! One YAML file declares one connector type and where its implementation
//! lives.

use crate::auth::AuthConfig;
use crate::connector::Operation;
use serde::{Deserialize, Serialize};

/// Connector manifest - root structure of a connector YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorManifest {
    /// Manifest name (must be unique)
    pub name: String,

    /// Manifest version (semver recommended)
    pub version: String,

    /// Whether this connector is registered
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data source type served by this connector (e.g. "mysql", "hive")
    pub type_id: String,

    /// Where the connector implementation lives
    pub source: SourceConfig,
}

/// Connector source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source type
    #[serde(rename = "type")]
    pub source_type: SourceType,

    /// Catalog file (when type = file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Remote connector endpoint (when type = http)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Request timeout (e.g., "5s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Operations the remote connector supports (http only, default all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Operation>,
}

/// Source type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Local JSON catalog
    File,

    /// Remote connector service
    Http,
}

impl SourceType {
    /// Get the string representation of the source type
    /// This matches the serde serialization format (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::File => "file",
            SourceType::Http => "http",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}
