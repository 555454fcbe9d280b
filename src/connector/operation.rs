//! Metadata operations and their fixed positional signatures

use crate::error::{MetadataError, MetadataResult};
use crate::models::{ConnectionParams, MetaColumnInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Closed set of operations a connector can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "getConnection")]
    GetConnection,
    #[serde(rename = "getDatabases")]
    GetDatabases,
    #[serde(rename = "getTables")]
    GetTables,
    #[serde(rename = "getTableProps")]
    GetTableProps,
    #[serde(rename = "getPartitions")]
    GetPartitions,
    #[serde(rename = "getColumns")]
    GetColumns,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::GetConnection,
        Operation::GetDatabases,
        Operation::GetTables,
        Operation::GetTableProps,
        Operation::GetPartitions,
        Operation::GetColumns,
    ];

    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetConnection => "getConnection",
            Operation::GetDatabases => "getDatabases",
            Operation::GetTables => "getTables",
            Operation::GetTableProps => "getTableProps",
            Operation::GetPartitions => "getPartitions",
            Operation::GetColumns => "getColumns",
        }
    }

    /// Names of the positional arguments, in call order
    pub fn signature(&self) -> &'static [&'static str] {
        match self {
            Operation::GetConnection => &["operator", "params"],
            Operation::GetDatabases => &["creator", "params"],
            Operation::GetTables => &["creator", "params", "database"],
            Operation::GetTableProps | Operation::GetPartitions | Operation::GetColumns => {
                &["creator", "params", "database", "table"]
            }
        }
    }

    pub fn arity(&self) -> usize {
        self.signature().len()
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named operation plus its positional arguments
///
/// Argument order is part of the contract. Use the constructors to build
/// well-formed requests; [`OperationRequest::new`] accepts anything and leaves
/// validation to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: Operation,
    pub args: Vec<Value>,
}

impl OperationRequest {
    pub fn new(operation: Operation, args: Vec<Value>) -> Self {
        Self { operation, args }
    }

    pub fn get_connection(operator: &str, params: &ConnectionParams) -> Self {
        Self::new(
            Operation::GetConnection,
            vec![Value::from(operator), Value::Object(params.clone())],
        )
    }

    pub fn get_databases(creator: &str, params: &ConnectionParams) -> Self {
        Self::new(
            Operation::GetDatabases,
            vec![Value::from(creator), Value::Object(params.clone())],
        )
    }

    pub fn get_tables(creator: &str, params: &ConnectionParams, database: &str) -> Self {
        Self::new(
            Operation::GetTables,
            vec![
                Value::from(creator),
                Value::Object(params.clone()),
                Value::from(database),
            ],
        )
    }

    pub fn get_table_props(
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Self {
        Self::table_scoped(Operation::GetTableProps, creator, params, database, table)
    }

    pub fn get_partitions(
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Self {
        Self::table_scoped(Operation::GetPartitions, creator, params, database, table)
    }

    pub fn get_columns(
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Self {
        Self::table_scoped(Operation::GetColumns, creator, params, database, table)
    }

    fn table_scoped(
        operation: Operation,
        creator: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Self {
        Self::new(
            operation,
            vec![
                Value::from(creator),
                Value::Object(params.clone()),
                Value::from(database),
                Value::from(table),
            ],
        )
    }
}

/// What a connector produced, tagged by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum OperationOutput {
    /// `getConnection` succeeded
    Connected,
    /// Database or table names
    Names(Vec<String>),
    /// Table properties
    Properties(HashMap<String, String>),
    /// Connector-native partition value, normalized by the facade
    Partitions(Value),
    Columns(Vec<MetaColumnInfo>),
}

impl OperationOutput {
    pub fn shape(&self) -> &'static str {
        match self {
            OperationOutput::Connected => "connected",
            OperationOutput::Names(_) => "names",
            OperationOutput::Properties(_) => "properties",
            OperationOutput::Partitions(_) => "partitions",
            OperationOutput::Columns(_) => "columns",
        }
    }

    /// Shape an operation is expected to produce
    pub fn expected_shape(operation: Operation) -> &'static str {
        match operation {
            Operation::GetConnection => "connected",
            Operation::GetDatabases | Operation::GetTables => "names",
            Operation::GetTableProps => "properties",
            Operation::GetPartitions => "partitions",
            Operation::GetColumns => "columns",
        }
    }

    /// Unpack a `getConnection` result
    pub fn into_connected(self, type_id: &str) -> MetadataResult<()> {
        match self {
            OperationOutput::Connected => Ok(()),
            other => Err(other.mismatch(type_id, Operation::GetConnection)),
        }
    }

    /// Unpack a `getDatabases` or `getTables` result
    pub fn into_names(self, type_id: &str, operation: Operation) -> MetadataResult<Vec<String>> {
        match self {
            OperationOutput::Names(names) => Ok(names),
            other => Err(other.mismatch(type_id, operation)),
        }
    }

    pub fn into_properties(self, type_id: &str) -> MetadataResult<HashMap<String, String>> {
        match self {
            OperationOutput::Properties(props) => Ok(props),
            other => Err(other.mismatch(type_id, Operation::GetTableProps)),
        }
    }

    /// Unpack the raw, not yet normalized, partition value
    pub fn into_partitions(self, type_id: &str) -> MetadataResult<Value> {
        match self {
            OperationOutput::Partitions(raw) => Ok(raw),
            other => Err(other.mismatch(type_id, Operation::GetPartitions)),
        }
    }

    pub fn into_columns(self, type_id: &str) -> MetadataResult<Vec<MetaColumnInfo>> {
        match self {
            OperationOutput::Columns(columns) => Ok(columns),
            other => Err(other.mismatch(type_id, Operation::GetColumns)),
        }
    }

    fn mismatch(&self, type_id: &str, operation: Operation) -> MetadataError {
        MetadataError::ConnectorExecution {
            type_id: type_id.to_string(),
            operation,
            message: format!(
                "expected {} result, connector returned {}",
                Self::expected_shape(operation),
                self.shape()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_matches_signature() {
        assert_eq!(Operation::GetConnection.arity(), 2);
        assert_eq!(Operation::GetDatabases.arity(), 2);
        assert_eq!(Operation::GetTables.arity(), 3);
        assert_eq!(Operation::GetTableProps.arity(), 4);
        assert_eq!(Operation::GetPartitions.arity(), 4);
        assert_eq!(Operation::GetColumns.arity(), 4);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for op in Operation::ALL {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, Value::from(op.as_str()));
            assert_eq!(Operation::from_name(op.as_str()), Some(op));
        }
        assert_eq!(Operation::from_name("dropTable"), None);
    }

    #[test]
    fn test_constructors_follow_signature() {
        let mut params = ConnectionParams::new();
        params.insert("host".to_string(), Value::from("h"));

        let request = OperationRequest::get_columns("u1", &params, "db1", "t1");
        assert_eq!(request.operation, Operation::GetColumns);
        assert_eq!(request.args.len(), Operation::GetColumns.arity());
        assert_eq!(request.args[0], "u1");
        assert_eq!(request.args[1]["host"], "h");
        assert_eq!(request.args[2], "db1");
        assert_eq!(request.args[3], "t1");
    }

    #[test]
    fn test_output_shapes() {
        for op in Operation::ALL {
            assert!(!OperationOutput::expected_shape(op).is_empty());
        }
        assert_eq!(
            OperationOutput::Names(vec![]).shape(),
            OperationOutput::expected_shape(Operation::GetTables)
        );
    }

    #[test]
    fn test_unpack_matching_output() {
        assert!(OperationOutput::Connected.into_connected("mysql").is_ok());
        assert_eq!(
            OperationOutput::Names(vec!["db1".to_string()])
                .into_names("mysql", Operation::GetDatabases)
                .unwrap(),
            vec!["db1"]
        );
        assert_eq!(
            OperationOutput::Partitions(Value::Null)
                .into_partitions("hive")
                .unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_unpack_mismatched_output() {
        let err = OperationOutput::Names(vec![])
            .into_columns("mysql")
            .unwrap_err();
        match err {
            MetadataError::ConnectorExecution {
                type_id,
                operation,
                message,
            } => {
                assert_eq!(type_id, "mysql");
                assert_eq!(operation, Operation::GetColumns);
                assert_eq!(message, "expected columns result, connector returned names");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            OperationOutput::Connected.into_properties("es"),
            Err(MetadataError::ConnectorExecution { .. })
        ));
        assert!(matches!(
            OperationOutput::Columns(vec![]).into_names("es", Operation::GetTables),
            Err(MetadataError::ConnectorExecution { operation: Operation::GetTables, .. })
        ));
        assert!(OperationOutput::Properties(HashMap::new()).into_connected("es").is_err());
        assert!(OperationOutput::Connected.into_partitions("es").is_err());
    }
}
