//! Partition trees and their normalization
//!
//! Connectors are free to return partitions in whatever native shape they
//! build. Before reaching the caller the value goes through a JSON text round
//! trip and comes out as a [`MetaPartitionInfo`].

use crate::error::{MetadataError, MetadataResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partition layout of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetaPartitionInfo {
    /// Partition key names, outermost first
    #[serde(default, alias = "part_keys")]
    pub part_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Root of the partition value tree
    #[serde(default)]
    pub root: PartitionNode,
}

/// One level of the partition value tree
///
/// Children are keyed by partition value, e.g. `ds=2024-01-01`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub partitions: BTreeMap<String, PartitionNode>,
}

impl MetaPartitionInfo {
    /// True when there are no keys and no partition values
    pub fn is_empty(&self) -> bool {
        self.part_keys.is_empty() && self.root.partitions.is_empty()
    }

    /// Every root-to-leaf path of partition values
    pub fn paths(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        collect_paths(&self.root, &mut current, &mut out);
        out
    }
}

fn collect_paths(node: &PartitionNode, current: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for (value, child) in &node.partitions {
        current.push(value.clone());
        if child.partitions.is_empty() {
            out.push(current.clone());
        } else {
            collect_paths(child, current, out);
        }
        current.pop();
    }
}

/// Normalize a connector-returned partition value into [`MetaPartitionInfo`]
///
/// The value is serialized to JSON text and parsed back into the canonical
/// shape. A JSON `null` yields an empty layout. Fields outside the canonical
/// shape are rejected rather than dropped. Any failure keeps the underlying
/// serde message.
pub fn normalize_partitions<T: Serialize + ?Sized>(raw: &T) -> MetadataResult<MetaPartitionInfo> {
    let text =
        serde_json::to_string(raw).map_err(|e| MetadataError::Serialization(e.to_string()))?;

    let parsed: Option<MetaPartitionInfo> =
        serde_json::from_str(&text).map_err(|e| MetadataError::Serialization(e.to_string()))?;

    Ok(parsed.unwrap_or_default())
}
