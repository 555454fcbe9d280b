//! Column descriptions

use serde::{Deserialize, Serialize};

/// A single column of a table
///
/// Sequences of columns keep the order the connector reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaColumnInfo {
    /// Ordinal position within the table
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub primary_key: bool,

    pub name: String,

    /// Engine-native type name
    #[serde(rename = "type")]
    pub column_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MetaColumnInfo {
    pub fn new(index: u32, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            column_type: column_type.into(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_wire_names() {
        let column = MetaColumnInfo {
            primary_key: true,
            ..MetaColumnInfo::new(0, "id", "bigint")
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "bigint");
        assert_eq!(json["primaryKey"], true);
        assert!(json.get("comment").is_none());
    }

    #[test]
    fn test_column_minimal_deserialization() {
        let json = r#"{"name": "created_at", "type": "timestamp", "comment": "row creation"}"#;
        let column: MetaColumnInfo = serde_json::from_str(json).unwrap();
        assert_eq!(column.name, "created_at");
        assert_eq!(column.column_type, "timestamp");
        assert_eq!(column.comment.as_deref(), Some("row creation"));
        assert!(!column.primary_key);
    }
}
