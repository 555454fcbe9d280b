//! Operation dispatcher
//!
//! Validates an [`OperationRequest`] against the connector's declared
//! capabilities and the operation's fixed signature, then calls exactly one
//! connector method. Malformed requests never reach connector code, and
//! nothing a connector does (including panicking) escapes as anything other
//! than a [`MetadataError`].

use crate::connector::{MetadataConnector, Operation, OperationOutput, OperationRequest};
use crate::error::{MetadataError, MetadataResult};
use crate::models::ConnectionParams;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;

/// Stateless dispatcher for connector operations
#[derive(Debug, Default, Clone, Copy)]
pub struct OperationDispatcher;

/// Decoded positional arguments
struct CallArgs {
    principal: String,
    params: ConnectionParams,
    database: Option<String>,
    table: Option<String>,
}

impl OperationDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Invoke one operation on a connector
    pub async fn invoke(
        &self,
        connector: &dyn MetadataConnector,
        request: OperationRequest,
    ) -> MetadataResult<OperationOutput> {
        let operation = request.operation;

        if !connector.capabilities().contains(&operation) {
            return Err(MetadataError::UnsupportedOperation {
                type_id: connector.type_id().to_string(),
                operation,
            });
        }

        let args = Self::decode_args(operation, request.args)?;

        tracing::debug!(
            "Dispatching {} to connector '{}'",
            operation,
            connector.type_id()
        );

        let call = AssertUnwindSafe(Self::call(connector, operation, &args)).catch_unwind();

        match call.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(MetadataError::ConnectorExecution {
                type_id: connector.type_id().to_string(),
                operation,
                message: format!("{:#}", e),
            }),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    "Connector '{}' panicked during {}: {}",
                    connector.type_id(),
                    operation,
                    message
                );
                Err(MetadataError::ConnectorExecution {
                    type_id: connector.type_id().to_string(),
                    operation,
                    message: format!("connector panicked: {}", message),
                })
            }
        }
    }

    /// Check arity and decode each positional slot into its type
    fn decode_args(operation: Operation, args: Vec<Value>) -> MetadataResult<CallArgs> {
        let signature = operation.signature();
        if args.len() != signature.len() {
            return Err(MetadataError::InvalidArgument {
                operation,
                message: format!(
                    "expected {} argument(s) ({}), got {}",
                    signature.len(),
                    signature.join(", "),
                    args.len()
                ),
            });
        }

        let mut args = args.into_iter();
        let principal = string_slot(operation, signature[0], args.next().unwrap_or_default())?;
        let params = match args.next().unwrap_or_default() {
            Value::Object(map) => map,
            other => {
                return Err(MetadataError::InvalidArgument {
                    operation,
                    message: format!("argument 'params' must be an object, got {}", kind(&other)),
                });
            }
        };

        // Remaining slots are database then table
        let database = args.next().map(|v| string_slot(operation, "database", v)).transpose()?;
        let table = args.next().map(|v| string_slot(operation, "table", v)).transpose()?;

        Ok(CallArgs {
            principal,
            params,
            database,
            table,
        })
    }

    async fn call(
        connector: &dyn MetadataConnector,
        operation: Operation,
        args: &CallArgs,
    ) -> anyhow::Result<OperationOutput> {
        let principal = args.principal.as_str();
        let params = &args.params;
        let database = args.database.as_deref().unwrap_or_default();
        let table = args.table.as_deref().unwrap_or_default();

        let output = match operation {
            Operation::GetConnection => {
                connector.get_connection(principal, params).await?;
                OperationOutput::Connected
            }
            Operation::GetDatabases => {
                OperationOutput::Names(connector.get_databases(principal, params).await?)
            }
            Operation::GetTables => OperationOutput::Names(
                connector.get_tables(principal, params, database).await?,
            ),
            Operation::GetTableProps => OperationOutput::Properties(
                connector
                    .get_table_props(principal, params, database, table)
                    .await?,
            ),
            Operation::GetPartitions => OperationOutput::Partitions(
                connector
                    .get_partitions(principal, params, database, table)
                    .await?,
            ),
            Operation::GetColumns => OperationOutput::Columns(
                connector
                    .get_columns(principal, params, database, table)
                    .await?,
            ),
        };

        Ok(output)
    }
}

fn string_slot(operation: Operation, slot: &str, value: Value) -> MetadataResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(MetadataError::InvalidArgument {
            operation,
            message: format!("argument '{}' must be a string, got {}", slot, kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetaColumnInfo;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Connector that records calls and echoes its arguments
    struct EchoConnector {
        calls: AtomicUsize,
        capabilities: Vec<Operation>,
    }

    impl EchoConnector {
        fn with(capabilities: &[Operation]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                capabilities: capabilities.to_vec(),
            }
        }
    }

    #[async_trait]
    impl MetadataConnector for EchoConnector {
        fn type_id(&self) -> &str {
            "echo"
        }

        fn capabilities(&self) -> &[Operation] {
            &self.capabilities
        }

        async fn get_connection(&self, operator: &str, _: &ConnectionParams) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if operator == "boom" {
                panic!("driver exploded");
            }
            Ok(())
        }

        async fn get_databases(&self, creator: &str, _: &ConnectionParams) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![creator.to_string()])
        }

        async fn get_tables(
            &self,
            creator: &str,
            params: &ConnectionParams,
            database: &str,
        ) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let host = params.get("host").and_then(Value::as_str).unwrap_or("?");
            Ok(vec![creator.to_string(), host.to_string(), database.to_string()])
        }

        async fn get_table_props(
            &self,
            _: &str,
            _: &ConnectionParams,
            database: &str,
            table: &str,
        ) -> anyhow::Result<HashMap<String, String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([(database.to_string(), table.to_string())]))
        }

        async fn get_partitions(
            &self,
            _: &str,
            _: &ConnectionParams,
            _: &str,
            _: &str,
        ) -> anyhow::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("metastore unavailable")
        }

        async fn get_columns(
            &self,
            _: &str,
            _: &ConnectionParams,
            _: &str,
            table: &str,
        ) -> anyhow::Result<Vec<MetaColumnInfo>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![MetaColumnInfo::new(0, table, "string")])
        }
    }

    fn params() -> ConnectionParams {
        let mut params = ConnectionParams::new();
        params.insert("host".to_string(), json!("h"));
        params
    }

    #[tokio::test]
    async fn test_dispatch_passes_args_in_order() {
        let connector = EchoConnector::with(&Operation::ALL);
        let output = OperationDispatcher::new()
            .invoke(&connector, OperationRequest::get_tables("u1", &params(), "db1"))
            .await
            .unwrap();

        assert_eq!(
            output,
            OperationOutput::Names(vec!["u1".to_string(), "h".to_string(), "db1".to_string()])
        );
    }

    #[tokio::test]
    async fn test_table_scoped_ops() {
        let connector = EchoConnector::with(&Operation::ALL);
        let dispatcher = OperationDispatcher::new();

        let props = dispatcher
            .invoke(&connector, OperationRequest::get_table_props("u1", &params(), "db1", "t1"))
            .await
            .unwrap();
        assert_eq!(
            props,
            OperationOutput::Properties(HashMap::from([("db1".to_string(), "t1".to_string())]))
        );

        let columns = dispatcher
            .invoke(&connector, OperationRequest::get_columns("u1", &params(), "db1", "t1"))
            .await
            .unwrap();
        assert!(matches!(columns, OperationOutput::Columns(ref c) if c[0].name == "t1"));
    }

    #[tokio::test]
    async fn test_unsupported_operation_never_calls_connector() {
        let connector = EchoConnector::with(&[Operation::GetDatabases]);
        let err = OperationDispatcher::new()
            .invoke(&connector, OperationRequest::get_tables("u1", &params(), "db1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MetadataError::UnsupportedOperation {
                operation: Operation::GetTables,
                ..
            }
        ));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_arity_mismatch_never_calls_connector() {
        let connector = EchoConnector::with(&Operation::ALL);
        let dispatcher = OperationDispatcher::new();

        let short = OperationRequest::new(Operation::GetColumns, vec![json!("u1"), json!({}), json!("db1")]);
        let err = dispatcher.invoke(&connector, short).await.unwrap_err();
        assert!(matches!(err, MetadataError::InvalidArgument { .. }));
        assert!(err.to_string().contains("expected 4 argument(s)"));

        let long = OperationRequest::new(
            Operation::GetDatabases,
            vec![json!("u1"), json!({}), json!("extra")],
        );
        assert!(matches!(
            dispatcher.invoke(&connector, long).await,
            Err(MetadataError::InvalidArgument { .. })
        ));

        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_argument_type_mismatch() {
        let connector = EchoConnector::with(&Operation::ALL);
        let dispatcher = OperationDispatcher::new();

        let swapped = OperationRequest::new(Operation::GetDatabases, vec![json!({}), json!("u1")]);
        let err = dispatcher.invoke(&connector, swapped).await.unwrap_err();
        assert!(err.to_string().contains("'creator' must be a string"));

        let bad_table = OperationRequest::new(
            Operation::GetColumns,
            vec![json!("u1"), json!({}), json!("db1"), json!(7)],
        );
        let err = dispatcher.invoke(&connector, bad_table).await.unwrap_err();
        assert!(err.to_string().contains("'table' must be a string, got number"));

        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connector_error_is_wrapped() {
        let connector = EchoConnector::with(&Operation::ALL);
        let err = OperationDispatcher::new()
            .invoke(&connector, OperationRequest::get_partitions("u1", &params(), "db1", "t1"))
            .await
            .unwrap_err();

        match err {
            MetadataError::ConnectorExecution { type_id, message, .. } => {
                assert_eq!(type_id, "echo");
                assert_eq!(message, "metastore unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connector_panic_is_contained() {
        let connector = EchoConnector::with(&Operation::ALL);
        let err = OperationDispatcher::new()
            .invoke(&connector, OperationRequest::get_connection("boom", &params()))
            .await
            .unwrap_err();

        assert!(matches!(err, MetadataError::ConnectorExecution { .. }));
        assert!(err.to_string().contains("driver exploded"));
    }
}
