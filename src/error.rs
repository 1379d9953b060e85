//! Error types for OpalDB
//!
//! This module defines all error types used throughout the database engine.

use thiserror::Error;

/// The main error type for OpalDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Lexer error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Parse error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    // ========== Schema Errors ==========
    #[error("Schema error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Schema error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Schema error: {0}")]
    InvalidDefinition(String),

    #[error("Schema error: unknown column '{0}' in table '{1}'")]
    UnknownColumn(String, String),

    #[error("Schema error: expected {expected} values, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    // ========== Type Errors ==========
    #[error("Type error: cannot convert {got} to {expected} for column '{column}'")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Type error: value for column '{column}' exceeds maximum length {max}")]
    LengthExceeded { column: String, max: usize },

    #[error("Type error: primary key column '{0}' cannot be NULL")]
    NullPrimaryKey(String),

    #[error("Type error: null value not allowed for column '{0}'")]
    NullNotAllowed(String),

    // ========== Constraint Errors ==========
    #[error("Constraint error: duplicate value '{value}' for unique column '{column}'")]
    DuplicateValue { column: String, value: String },

    #[error("Constraint error: duplicate primary key value '{0}'")]
    DuplicatePrimaryKey(String),

    // ========== Index Errors ==========
    #[error("Index error: index on '{0}.{1}' already exists")]
    IndexAlreadyExists(String, String),

    #[error("Index error: no index on '{0}.{1}'")]
    IndexNotFound(String, String),

    #[error("Index error: unique violation for value '{value}' on column '{column}'")]
    UniqueViolation { column: String, value: String },

    // ========== Execution Errors ==========
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Execution error: cannot compare {left} to {right} with '{op}'")]
    IncomparableValues {
        left: String,
        right: String,
        op: String,
    },

    // ========== Snapshot Errors ==========
    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for OpalDB operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "Schema error: table 'users' not found");

        let err = Error::UnexpectedCharacter('@', 5);
        assert_eq!(
            err.to_string(),
            "Lexer error: unexpected character '@' at position 5"
        );
    }

    #[test]
    fn test_constraint_error_display() {
        let err = Error::DuplicateValue {
            column: "email".to_string(),
            value: "a@b.c".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Constraint error: duplicate value 'a@b.c' for unique column 'email'"
        );

        let err = Error::TypeMismatch {
            column: "age".to_string(),
            expected: "INTEGER".to_string(),
            got: "TEXT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type error: cannot convert TEXT to INTEGER for column 'age'"
        );
    }
}
