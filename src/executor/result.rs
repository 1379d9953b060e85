//! Execution results
//!
//! Every statement yields an `ExecutionResult`; errors never cross the
//! executor boundary. The REPL and HTTP layers own presentation and only
//! ever see this shape.

use crate::storage::Row;
use serde::Serialize;

/// The outcome of executing one statement
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Did the statement succeed?
    pub success: bool,
    /// Human-readable outcome ("2 row(s) returned", error text, ...)
    pub message: String,
    /// Result rows, for SELECT
    #[serde(rename = "data")]
    pub rows: Option<Vec<Row>>,
    /// Result column names, in projection order
    pub columns: Option<Vec<String>>,
}

impl ExecutionResult {
    /// A successful result carrying only a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            rows: None,
            columns: None,
        }
    }

    /// A successful result carrying rows
    pub fn with_rows(message: impl Into<String>, rows: Vec<Row>, columns: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            rows: Some(rows),
            columns: Some(columns),
        }
    }

    /// A failed result; the message is the error's display text
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            rows: None,
            columns: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Value;

    #[test]
    fn test_rows_serialize_under_data_key() {
        let mut row = Row::new();
        row.set("id", Value::Integer(1));
        let result = ExecutionResult::with_rows("1 row(s) returned", vec![row], vec!["id".into()]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["id"], 1);
        assert_eq!(json["columns"][0], "id");
        assert!(json.get("rows").is_none());
    }

    #[test]
    fn test_failure_has_no_rows() {
        let result = ExecutionResult::failure("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["data"], serde_json::Value::Null);
    }
}
