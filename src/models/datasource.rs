//! Resolved data source information

use super::ConnectionParams;
use serde::{Deserialize, Serialize};

/// Result of resolving a data source id through the data-source manager
///
/// Produced fresh for every facade call and never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub success: bool,

    /// Data source type, used as the connector type id
    #[serde(rename = "type", default)]
    pub ds_type: String,

    /// User that owns the data source
    #[serde(default)]
    pub creator: String,

    /// Connection parameters forwarded to the connector
    #[serde(default)]
    pub params: ConnectionParams,
}

impl DataSourceInfo {
    /// Whether the resolved type is empty or whitespace only
    pub fn has_blank_type(&self) -> bool {
        self.ds_type.trim().is_empty()
    }
}
