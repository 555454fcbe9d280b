//! Error types for metadata dispatch
//!
//! Every failure a caller of [`crate::MetadataService`] can observe maps onto
//! one variant here. Nothing is retried and nothing is swallowed.

use crate::connector::Operation;

/// Fixed user-facing message for resolver transport failures
pub const REMOTE_TRANSPORT_MESSAGE: &str = "Remote Service Error[远端服务出错, 联系运维处理]";

/// Fixed user-facing message for a resolver reply with `success = false`
pub const REMOTE_LOGICAL_MESSAGE: &str = "Error in Data Source Manager Server[数据源服务出错]";

/// Metadata errors
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The data-source manager could not be reached or answered garbage
    #[error("{}", REMOTE_TRANSPORT_MESSAGE)]
    RemoteTransport,

    /// The data-source manager answered but reported a failure
    #[error("{}", REMOTE_LOGICAL_MESSAGE)]
    RemoteLogical,

    #[error("No connector available for data source type '{type_id}': {reason}")]
    ConnectorNotFound { type_id: String, reason: String },

    #[error("Connector '{type_id}' does not support operation {operation}")]
    UnsupportedOperation {
        type_id: String,
        operation: Operation,
    },

    #[error("Invalid arguments for {operation}: {message}")]
    InvalidArgument {
        operation: Operation,
        message: String,
    },

    #[error("Connector '{type_id}' failed during {operation}: {message}")]
    ConnectorExecution {
        type_id: String,
        operation: Operation,
        message: String,
    },

    #[error("Partitions Error msg:{0}")]
    Serialization(String),

    #[error("Connector conflict: {0}")]
    Conflict(String),
}

impl MetadataError {
    pub(crate) fn not_registered(type_id: &str) -> Self {
        MetadataError::ConnectorNotFound {
            type_id: type_id.to_string(),
            reason: "no connector registered".to_string(),
        }
    }

    /// Whether the failure came from the resolver round trip
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            MetadataError::RemoteTransport | MetadataError::RemoteLogical
        )
    }
}

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
