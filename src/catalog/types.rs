//! Data types for OpalDB
//!
//! This module defines the SQL data types supported by the database and
//! the coercion from literal values into a column's declared type.

use crate::storage::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL Data Types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Integer (64-bit)
    Integer,
    /// Double-precision floating point
    Float,
    /// Boolean type
    Boolean,
    /// Variable-length character string with optional max length
    Varchar(Option<usize>),
}

impl DataType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Max length for VARCHAR columns, if declared
    pub fn max_length(&self) -> Option<usize> {
        match self {
            DataType::Varchar(n) => *n,
            _ => None,
        }
    }

    /// Coerce a literal value into this type.
    ///
    /// Returns `None` when the combination is not convertible. The rules:
    /// NULL passes through every type (nullability is checked separately);
    /// text converts to INTEGER/FLOAT only when the full literal parses;
    /// BOOLEAN accepts TRUE/FALSE (any case), 1/0, and yes/no; INTEGER
    /// truncates floats toward zero; FLOAT widens integers. Everything
    /// else is a mismatch.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),

            (DataType::Integer, Value::Integer(i)) => Some(Value::Integer(*i)),
            (DataType::Integer, Value::Float(f)) => Some(Value::Integer(*f as i64)),
            (DataType::Integer, Value::Text(s)) => s.parse::<i64>().ok().map(Value::Integer),

            (DataType::Float, Value::Float(f)) => Some(Value::Float(*f)),
            (DataType::Float, Value::Integer(i)) => Some(Value::Float(*i as f64)),
            (DataType::Float, Value::Text(s)) => s.parse::<f64>().ok().map(Value::Float),

            (DataType::Boolean, Value::Boolean(b)) => Some(Value::Boolean(*b)),
            (DataType::Boolean, Value::Integer(1)) => Some(Value::Boolean(true)),
            (DataType::Boolean, Value::Integer(0)) => Some(Value::Boolean(false)),
            (DataType::Boolean, Value::Text(s)) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Value::Boolean(true)),
                "false" | "0" | "no" => Some(Value::Boolean(false)),
                _ => None,
            },

            (DataType::Varchar(_), Value::Text(s)) => Some(Value::Text(s.clone())),

            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Varchar(Some(n)) => write!(f, "VARCHAR({})", n),
            DataType::Varchar(None) => write!(f, "VARCHAR"),
        }
    }
}
