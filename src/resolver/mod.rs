//! Data source resolution
//!
//! Maps `(data source id, calling system)` to a [`DataSourceInfo`] through one
//! request/response round trip with the data-source manager. Three outcomes
//! are kept apart:
//!
//! - transport failure (no reply, timeout, garbage, wrong message kind)
//!   becomes [`MetadataError::RemoteTransport`]
//! - a reply with `success = false` becomes [`MetadataError::RemoteLogical`]
//! - a successful reply is returned as-is, even when its type is blank
//!
//! No retries happen here.

mod http;
pub mod protocol;

pub use http::HttpTransport;
pub use protocol::{DsInfoQueryRequest, DsInfoResponse, ResolverReply, TransportError};

use crate::error::{MetadataError, MetadataResult};
use crate::models::DataSourceInfo;
use async_trait::async_trait;
use protocol::DS_INFO_RESPONSE_KIND;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Request/response channel to the data-source manager
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolverTransport: Send + Sync {
    /// Send one lookup and return the raw reply
    async fn ask(&self, request: &DsInfoQueryRequest) -> Result<Value, TransportError>;
}

/// Resolves data source ids to connection information
#[derive(Clone)]
pub struct DataSourceResolver {
    transport: Arc<dyn ResolverTransport>,
    timeout: Duration,
}

impl DataSourceResolver {
    pub fn new(transport: Arc<dyn ResolverTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one lookup and classify the reply
    pub async fn ask(&self, data_source_id: &str, system: &str) -> ResolverReply {
        let request = DsInfoQueryRequest::new(data_source_id, system);

        let raw = match tokio::time::timeout(self.timeout, self.transport.ask(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                return ResolverReply::TransportFailed {
                    reason: e.to_string(),
                };
            }
            Err(_) => {
                return ResolverReply::TransportFailed {
                    reason: format!("no reply within {:?}", self.timeout),
                };
            }
        };

        Self::classify(raw)
    }

    fn classify(raw: Value) -> ResolverReply {
        if let Some(kind) = raw.get("kind") {
            if kind.as_str() != Some(DS_INFO_RESPONSE_KIND) {
                return ResolverReply::TransportFailed {
                    reason: format!("unexpected reply kind: {}", kind),
                };
            }
        }

        match serde_json::from_value::<DsInfoResponse>(raw) {
            Ok(response) if response.success => ResolverReply::Found(response.into()),
            Ok(response) => ResolverReply::Rejected {
                message: response.message,
            },
            Err(e) => ResolverReply::TransportFailed {
                reason: format!("malformed reply: {}", e),
            },
        }
    }

    /// Resolve a data source id, mapping failures to their fixed errors
    pub async fn resolve(&self, data_source_id: &str, system: &str) -> MetadataResult<DataSourceInfo> {
        match self.ask(data_source_id, system).await {
            ResolverReply::Found(info) => {
                tracing::debug!(
                    "Resolved data source {} (system {}) to type '{}'",
                    data_source_id,
                    system,
                    info.ds_type
                );
                Ok(info)
            }
            ResolverReply::Rejected { message } => {
                tracing::warn!(
                    "Data source manager rejected {} (system {}): {}",
                    data_source_id,
                    system,
                    message.as_deref().unwrap_or("no reason given")
                );
                Err(MetadataError::RemoteLogical)
            }
            ResolverReply::TransportFailed { reason } => {
                tracing::warn!(
                    "Data source lookup for {} (system {}) failed: {}",
                    data_source_id,
                    system,
                    reason
                );
                Err(MetadataError::RemoteTransport)
            }
        }
    }
}

impl std::fmt::Debug for DataSourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceResolver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver_with(transport: MockResolverTransport) -> DataSourceResolver {
        DataSourceResolver::new(Arc::new(transport), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .withf(|req| req.data_source_id == "ds-42" && req.system == "wtss")
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "kind": "ds_info_response",
                    "success": true,
                    "type": "mysql",
                    "creator": "u1",
                    "params": {"host": "h"}
                }))
            });

        let info = resolver_with(transport).resolve("ds-42", "wtss").await.unwrap();
        assert_eq!(info.ds_type, "mysql");
        assert_eq!(info.creator, "u1");
        assert_eq!(info.params["host"], "h");
    }

    #[tokio::test]
    async fn test_blank_type_is_not_an_error() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .returning(|_| Ok(json!({"success": true, "type": "", "creator": "u1"})));

        let info = resolver_with(transport).resolve("ds-1", "wtss").await.unwrap();
        assert!(info.has_blank_type());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .returning(|_| Err(TransportError::Unreachable("connection refused".to_string())));

        let err = resolver_with(transport).resolve("ds-1", "wtss").await.unwrap_err();
        assert!(matches!(err, MetadataError::RemoteTransport));
        // Transport detail stays out of the user-facing message
        assert!(!err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_garbled_reply_is_transport_failure() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .returning(|_| Ok(json!({"success": "yes"})));

        let err = resolver_with(transport).resolve("ds-1", "wtss").await.unwrap_err();
        assert!(matches!(err, MetadataError::RemoteTransport));
    }

    #[tokio::test]
    async fn test_wrong_reply_kind_is_transport_failure() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .returning(|_| Ok(json!({"kind": "heartbeat", "success": true, "type": "mysql"})));

        let reply = resolver_with(transport).ask("ds-1", "wtss").await;
        assert!(matches!(reply, ResolverReply::TransportFailed { .. }));
    }

    #[tokio::test]
    async fn test_logical_failure() {
        let mut transport = MockResolverTransport::new();
        transport
            .expect_ask()
            .returning(|_| Ok(json!({"success": false, "message": "unknown data source"})));

        let resolver = resolver_with(transport);
        let reply = resolver.ask("ds-404", "wtss").await;
        assert_eq!(
            reply,
            ResolverReply::Rejected {
                message: Some("unknown data source".to_string())
            }
        );

        let err = resolver.resolve("ds-404", "wtss").await.unwrap_err();
        assert!(matches!(err, MetadataError::RemoteLogical));
    }

    /// Transport that never answers
    struct SilentTransport;

    #[async_trait]
    impl ResolverTransport for SilentTransport {
        async fn ask(&self, _request: &DsInfoQueryRequest) -> Result<Value, TransportError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let resolver = DataSourceResolver::new(Arc::new(SilentTransport), Duration::from_millis(20));
        let err = resolver.resolve("ds-1", "wtss").await.unwrap_err();
        assert!(matches!(err, MetadataError::RemoteTransport));
    }
}
