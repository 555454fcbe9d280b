//! Wire types exchanged with the data-source manager

use crate::models::{ConnectionParams, DataSourceInfo};
use serde::{Deserialize, Serialize};

/// Message kind tag the data-source manager puts on lookup replies
pub const DS_INFO_RESPONSE_KIND: &str = "ds_info_response";

/// Lookup request for one data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsInfoQueryRequest {
    pub data_source_id: String,
    /// Calling system, used by the manager for access decisions
    pub system: String,
}

impl DsInfoQueryRequest {
    pub fn new(data_source_id: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            data_source_id: data_source_id.into(),
            system: system.into(),
        }
    }
}

/// Lookup reply body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsInfoResponse {
    pub success: bool,

    #[serde(rename = "type", default)]
    pub ds_type: String,

    #[serde(default)]
    pub creator: String,

    #[serde(default)]
    pub params: ConnectionParams,

    /// Reason given by the manager when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<DsInfoResponse> for DataSourceInfo {
    fn from(response: DsInfoResponse) -> Self {
        DataSourceInfo {
            success: response.success,
            ds_type: response.ds_type,
            creator: response.creator,
            params: response.params,
        }
    }
}

/// Outcome of one lookup round trip
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverReply {
    /// Manager answered with `success = true` (the type may still be blank)
    Found(DataSourceInfo),
    /// Manager answered with `success = false`
    Rejected { message: Option<String> },
    /// No usable answer: unreachable, timed out, malformed or wrong kind
    TransportFailed { reason: String },
}

/// Failures reported by a resolver transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("data source manager unreachable: {0}")]
    Unreachable(String),

    #[error("data source manager returned status {0}")]
    Status(u16),

    #[error("undecodable reply: {0}")]
    Decode(String),
}
