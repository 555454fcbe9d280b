//! Metadata model layer
//!
//! Canonical shapes returned to callers, whatever the connector behind them
//! produced.
//!
//! Structure:
//! - `datasource.rs` - Resolved data source information
//! - `column.rs` - Column descriptions
//! - `partition.rs` - Partition trees and their normalization

pub mod column;
pub mod datasource;
pub mod partition;

pub use column::MetaColumnInfo;
pub use datasource::DataSourceInfo;
pub use partition::{MetaPartitionInfo, PartitionNode, normalize_partitions};

/// Connection parameters handed to connectors
pub type ConnectionParams = serde_json::Map<String, serde_json::Value>;
