//! metaroute
//!
//! Pluggable metadata-connector dispatch. A data source id is resolved to a
//! type and connection parameters through the data-source manager, then the
//! requested metadata operation is routed to the connector registered for
//! that type and its output normalized.
//!
//! ```no_run
//! use metaroute::resolver::HttpTransport;
//! use metaroute::{ConnectorRegistry, DataSourceResolver, MetadataService};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let transport = HttpTransport::new("http://127.0.0.1:9600/ds-info", None)?;
//! let resolver = DataSourceResolver::new(Arc::new(transport), Duration::from_secs(10));
//! let service = MetadataService::new(resolver, Arc::new(ConnectorRegistry::new()));
//! let tables = service.get_tables_by_ds_id("ds-42", "db1", "wtss").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod connector;
pub mod dispatcher;
pub mod duration;
pub mod error;
pub mod models;
pub mod plugins;
pub mod registry;
pub mod resolver;
pub mod service;

pub use connector::{MetadataConnector, Operation, OperationOutput, OperationRequest};
pub use dispatcher::OperationDispatcher;
pub use error::{MetadataError, MetadataResult};
pub use models::{DataSourceInfo, MetaColumnInfo, MetaPartitionInfo, PartitionNode};
pub use registry::ConnectorRegistry;
pub use resolver::{DataSourceResolver, ResolverReply, ResolverTransport};
pub use service::MetadataService;
