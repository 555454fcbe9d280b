//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::auth::AuthConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Data-source manager used to resolve data source ids
    #[serde(default)]
    pub data_source_service: ResolverConfig,

    /// Connector manifest settings
    #[serde(default)]
    pub connectors: ConnectorsConfig,

    /// Calling system sent with every lookup unless overridden per call
    #[serde(default = "default_system")]
    pub default_system: String,
}

/// Data-source manager configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Lookup endpoint, e.g. `http://dsm.internal:9600/ds-info`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Deadline for one lookup (e.g., "10s")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Connector manifest configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorsConfig {
    /// Manifest directory (defaults to `<config dir>/connectors`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Type ids to register; empty registers every manifest
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_types: Vec<String>,
}

fn default_system() -> String {
    "metaroute".to_string()
}

fn default_endpoint() -> String {
    "http://127.0.0.1:9600/ds-info".to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source_service: ResolverConfig::default(),
            connectors: ConnectorsConfig::default(),
            default_system: default_system(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            auth: None,
        }
    }
}
