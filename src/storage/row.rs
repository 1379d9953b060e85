//! Row and Value types for OpalDB
//!
//! This module defines how data values are represented in memory. A value
//! is one of five closed variants; a row is an ordered mapping from column
//! name to value, in schema column order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A value in the database
///
/// Serializes untagged so rows appear as natural JSON objects
/// (`{"id": 1, "name": "John", "active": true, "score": null}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// Text value
    Text(String),
}

// Implement PartialEq manually so Float can key a hash index via bitwise
// comparison.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
        }
    }

    /// Equality as seen by predicates and joins: Integer and Float compare
    /// numerically, NULL equals only NULL. Distinct from `==`, which is
    /// strict per-variant equality for index keys.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Integer(b)) => *a == (*b as f64),
            _ => self == other,
        }
    }

    /// Three-way comparison for range operators. Numbers compare with
    /// numbers and text with text; any other pairing (booleans, NULL,
    /// text against number) is incomparable and returns `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A row in a table: column name → value, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Set a column's value. An existing column keeps its position; a new
    /// column is appended.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// Get a value by exact column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Get a value by column name, falling back to the bare name when a
    /// table-qualified reference like `users.id` is given.
    pub fn resolve(&self, column: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(column) {
            return Some(value);
        }
        column
            .split_once('.')
            .and_then(|(_, bare)| self.values.get(bare))
    }

    /// Check whether the row has a column under the given (possibly
    /// qualified) name
    pub fn contains(&self, column: &str) -> bool {
        self.resolve(column).is_some()
    }

    /// Column names in row order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over (column, value) pairs in row order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge another row into a copy of this one. The other row's columns
    /// win on name collision; colliding columns keep this row's position.
    pub fn merge(&self, other: &Row) -> Row {
        let mut merged = self.clone();
        for (column, value) in other.iter() {
            merged.set(column.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
