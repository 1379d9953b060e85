//! SQL statement descriptors
//!
//! This module defines the command descriptor the parser hands to the
//! executor. Literal values inside a statement are already typed
//! (`Value`); the executor re-validates them against the schema but never
//! re-parses SQL text.

use crate::catalog::DataType;
use crate::storage::Value;
use std::fmt;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
}

impl Statement {
    /// Does executing this statement change the database?
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Statement::Select(_))
    }
}

/// Column definition inside CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}

/// INSERT statement (exactly one row of values)
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column names (optional; schema order when absent)
    pub columns: Option<Vec<String>>,
    /// Pre-typed values for the row
    pub values: Vec<Value>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Table to read from
    pub table_name: String,
    /// Columns to project
    pub projection: Projection,
    /// Optional JOIN clause
    pub join: Option<JoinClause>,
    /// Optional single-predicate WHERE clause
    pub where_clause: Option<Predicate>,
    /// Optional ORDER BY clause
    pub order_by: Option<OrderBy>,
    /// Optional LIMIT clause
    pub limit: Option<usize>,
}

/// Column projection: `*` or an ordered list of (possibly qualified) names
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// All columns
    All,
    /// Named columns in requested order
    Columns(Vec<String>),
}

/// JOIN clause: inner join against a second table on column equality.
/// `left_column` always belongs to the FROM table; the parser normalizes
/// qualified ON conditions so `ON a.x = b.y` and `ON b.y = a.x` agree.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Table to join with
    pub table_name: String,
    /// Join column on the FROM table
    pub left_column: String,
    /// Join column on the joined table
    pub right_column: String,
}

/// ORDER BY clause (single column)
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Column to sort by
    pub column: String,
    /// Ascending (true) or descending (false)
    pub ascending: bool,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// Optional WHERE clause
    pub where_clause: Option<Predicate>,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value (pre-typed)
    pub value: Value,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// Optional WHERE clause
    pub where_clause: Option<Predicate>,
}

/// A single `(column, operator, value)` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column to test (possibly table-qualified)
    pub column: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Value to compare against (pre-typed)
    pub value: Value,
}

/// Comparison operators supported in WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Gte => write!(f, ">="),
        }
    }
}
