//! Query Executor
//!
//! This module walks statement descriptors against the database and
//! renders every outcome, success or failure, into an `ExecutionResult`.
//! Statements run one at a time; a mutating statement that succeeds is
//! followed by a snapshot save when persistence is configured.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::ExecutionResult;
use crate::catalog::{Column, TableSchema};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::snapshot::SnapshotStore;
use crate::sql::ast::*;
use crate::sql::Parser;
use crate::storage::{Row, Value};

/// Statement executor over an owned database
pub struct QueryExecutor {
    database: Database,
    snapshot: Option<Box<dyn SnapshotStore + Send>>,
}

impl QueryExecutor {
    /// Create an executor over a fresh in-memory database, without
    /// persistence
    pub fn new() -> Self {
        Self {
            database: Database::new(),
            snapshot: None,
        }
    }

    /// Create an executor backed by a snapshot store. An existing
    /// snapshot is loaded; otherwise the database starts empty.
    pub fn with_snapshot(store: Box<dyn SnapshotStore + Send>) -> Result<Self> {
        let database = match store.load()? {
            Some(database) => {
                info!(tables = database.table_names().len(), "snapshot loaded");
                database
            }
            None => Database::new(),
        };
        Ok(Self {
            database,
            snapshot: Some(store),
        })
    }

    /// The underlying database (read-only)
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Parse and execute one SQL statement
    pub fn execute_sql(&mut self, sql: &str) -> ExecutionResult {
        match Parser::new(sql).and_then(|mut parser| parser.parse()) {
            Ok(statement) => self.execute(statement),
            Err(e) => ExecutionResult::failure(e.to_string()),
        }
    }

    /// Execute one statement. Never returns an error: failures become a
    /// result with `success: false` and the error's display text.
    pub fn execute(&mut self, statement: Statement) -> ExecutionResult {
        let mutation = statement.is_mutation();
        match self.run(statement) {
            Ok(result) => {
                if mutation {
                    self.persist();
                }
                result
            }
            Err(e) => {
                debug!(error = %e, "statement failed");
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    fn run(&mut self, statement: Statement) -> Result<ExecutionResult> {
        match statement {
            Statement::CreateTable(stmt) => self.execute_create_table(stmt),
            Statement::DropTable(stmt) => self.execute_drop_table(stmt),
            Statement::Insert(stmt) => self.execute_insert(stmt),
            Statement::Select(stmt) => self.execute_select(stmt),
            Statement::Update(stmt) => self.execute_update(stmt),
            Statement::Delete(stmt) => self.execute_delete(stmt),
        }
    }

    /// Save a snapshot after a successful mutation. A failed save is
    /// logged, not surfaced: in-memory state is the source of truth.
    fn persist(&self) {
        if let Some(store) = &self.snapshot {
            if let Err(e) = store.save(&self.database) {
                warn!(error = %e, "snapshot save failed; continuing with in-memory state");
            }
        }
    }

    // ========== CREATE / DROP TABLE ==========

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<ExecutionResult> {
        let mut columns = Vec::with_capacity(stmt.columns.len());
        let mut primary_key = None;
        let mut unique_columns = Vec::new();

        for def in &stmt.columns {
            columns.push(Column::new(&def.name, def.data_type.clone()).nullable(!def.not_null));
            if def.primary_key {
                primary_key = Some(def.name.clone());
            }
            if def.unique && !def.primary_key {
                unique_columns.push(def.name.clone());
            }
        }

        self.database
            .create_table(&stmt.table_name, columns, primary_key, unique_columns)?;
        info!(table = %stmt.table_name, "table created");

        Ok(ExecutionResult::ok(format!(
            "Table '{}' created",
            stmt.table_name
        )))
    }

    fn execute_drop_table(&mut self, stmt: DropTableStatement) -> Result<ExecutionResult> {
        self.database.drop_table(&stmt.table_name)?;
        info!(table = %stmt.table_name, "table dropped");

        Ok(ExecutionResult::ok(format!(
            "Table '{}' dropped",
            stmt.table_name
        )))
    }

    // ========== INSERT ==========

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<ExecutionResult> {
        let schema = self.database.schema(&stmt.table_name)?;
        let columns = match stmt.columns {
            Some(columns) => columns,
            None => schema.column_names(),
        };
        if columns.len() != stmt.values.len() {
            return Err(Error::ColumnCountMismatch {
                expected: columns.len(),
                got: stmt.values.len(),
            });
        }

        let candidate: Row = columns.into_iter().zip(stmt.values).collect();
        self.database.insert_row(&stmt.table_name, &candidate)?;

        Ok(ExecutionResult::ok("1 row(s) inserted"))
    }

    // ========== SELECT ==========

    fn execute_select(&self, stmt: SelectStatement) -> Result<ExecutionResult> {
        let schema = self.database.schema(&stmt.table_name)?;
        let mut available = schema.column_names();
        let mut rows = self.database.rows(&stmt.table_name)?.to_vec();

        if let Some(join) = &stmt.join {
            rows = self.join_rows(schema, rows, join)?;
            for column in self.database.schema(&join.table_name)?.column_names() {
                if !available.contains(&column) {
                    available.push(column);
                }
            }
        }

        if let Some(predicate) = &stmt.where_clause {
            check_column(&available, &predicate.column, &stmt.table_name)?;
            let mut kept = Vec::with_capacity(rows.len());
            for row in rows {
                if evaluate(&row, predicate)? {
                    kept.push(row);
                }
            }
            rows = kept;
        }

        let (mut rows, columns) = match stmt.projection {
            Projection::All => (rows, available),
            Projection::Columns(names) => {
                for name in &names {
                    check_column(&available, name, &stmt.table_name)?;
                }
                let projected = rows
                    .iter()
                    .map(|row| {
                        names
                            .iter()
                            .map(|name| {
                                let value =
                                    row.resolve(name).cloned().unwrap_or(Value::Null);
                                (name.clone(), value)
                            })
                            .collect()
                    })
                    .collect();
                (projected, names)
            }
        };

        if let Some(order) = &stmt.order_by {
            check_column(&columns, &order.column, &stmt.table_name)?;
            sort_rows(&mut rows, order);
        }
        if let Some(limit) = stmt.limit {
            rows.truncate(limit);
        }

        Ok(ExecutionResult::with_rows(
            format!("{} row(s) returned", rows.len()),
            rows,
            columns,
        ))
    }

    /// Nested-loop inner join: merge every matching left × right pair,
    /// right-hand columns winning on name collision
    fn join_rows(
        &self,
        left_schema: &TableSchema,
        left_rows: Vec<Row>,
        join: &JoinClause,
    ) -> Result<Vec<Row>> {
        if !left_schema.has_column(&join.left_column) {
            return Err(Error::UnknownColumn(
                join.left_column.clone(),
                left_schema.name().to_string(),
            ));
        }
        let right_schema = self.database.schema(&join.table_name)?;
        if !right_schema.has_column(&join.right_column) {
            return Err(Error::UnknownColumn(
                join.right_column.clone(),
                join.table_name.clone(),
            ));
        }

        let right_rows = self.database.rows(&join.table_name)?;
        let mut joined = Vec::new();
        for left in &left_rows {
            for right in right_rows {
                let hit = match (left.get(&join.left_column), right.get(&join.right_column)) {
                    (Some(l), Some(r)) => l.equals(r),
                    _ => false,
                };
                if hit {
                    joined.push(left.merge(right));
                }
            }
        }
        Ok(joined)
    }

    // ========== UPDATE ==========

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<ExecutionResult> {
        let schema = self.database.schema(&stmt.table_name)?.clone();
        for assignment in &stmt.assignments {
            if !schema.has_column(&assignment.column) {
                return Err(Error::UnknownColumn(
                    assignment.column.clone(),
                    stmt.table_name.clone(),
                ));
            }
        }
        if let Some(predicate) = &stmt.where_clause {
            check_schema_column(&schema, &predicate.column)?;
        }

        let mut rewritten = Vec::new();
        let mut updated = 0usize;
        for row in self.database.rows(&stmt.table_name)?.to_vec() {
            let matched = match &stmt.where_clause {
                Some(predicate) => evaluate(&row, predicate)?,
                None => true,
            };
            if matched {
                let mut candidate = row.clone();
                for assignment in &stmt.assignments {
                    candidate.set(assignment.column.clone(), assignment.value.clone());
                }
                rewritten.push(schema.validate_row(&candidate)?);
                updated += 1;
            } else {
                rewritten.push(row);
            }
        }

        // The whole table is rewritten, so uniqueness is checked against
        // the rewritten rows, not the (soon stale) indexes
        check_uniqueness(&schema, &rewritten)?;

        self.database.replace_rows(&stmt.table_name, rewritten)?;
        Ok(ExecutionResult::ok(format!("{} row(s) updated", updated)))
    }

    // ========== DELETE ==========

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<ExecutionResult> {
        let schema = self.database.schema(&stmt.table_name)?;
        if let Some(predicate) = &stmt.where_clause {
            check_schema_column(schema, &predicate.column)?;
        }

        let rows = self.database.rows(&stmt.table_name)?.to_vec();
        let mut kept = Vec::with_capacity(rows.len());
        let before = rows.len();
        for row in rows {
            let matched = match &stmt.where_clause {
                Some(predicate) => evaluate(&row, predicate)?,
                None => true,
            };
            if !matched {
                kept.push(row);
            }
        }
        let deleted = before - kept.len();

        self.database.replace_rows(&stmt.table_name, kept)?;
        Ok(ExecutionResult::ok(format!("{} row(s) deleted", deleted)))
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Predicate evaluation ==========

/// Evaluate a predicate against one (possibly merged) row.
///
/// `=`/`!=` are total; the range operators require an ordered pairing and
/// fail with `IncomparableValues` on booleans, NULLs, or mixed types.
fn evaluate(row: &Row, predicate: &Predicate) -> Result<bool> {
    let cell = row.resolve(&predicate.column).cloned().unwrap_or(Value::Null);
    match predicate.op {
        CompareOp::Eq => Ok(cell.equals(&predicate.value)),
        CompareOp::Neq => Ok(!cell.equals(&predicate.value)),
        op => {
            let ordering =
                cell.compare(&predicate.value)
                    .ok_or_else(|| Error::IncomparableValues {
                        left: cell.type_name().to_string(),
                        right: predicate.value.type_name().to_string(),
                        op: op.to_string(),
                    })?;
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Lte => ordering != Ordering::Greater,
                CompareOp::Gte => ordering != Ordering::Less,
                CompareOp::Eq | CompareOp::Neq => unreachable!(),
            })
        }
    }
}

/// Sort rows by one column. NULL and absent cells sort first regardless
/// of direction; incomparable pairs keep their relative order.
fn sort_rows(rows: &mut [Row], order: &OrderBy) {
    rows.sort_by(|a, b| {
        let left = a.resolve(&order.column).filter(|v| !v.is_null());
        let right = b.resolve(&order.column).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = l.compare(r).unwrap_or(Ordering::Equal);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            }
        }
    });
}

/// Check a (possibly qualified) column reference against a set of
/// available column names
fn check_column(available: &[String], name: &str, table: &str) -> Result<()> {
    let bare = name.split_once('.').map(|(_, b)| b).unwrap_or(name);
    let found = available.iter().any(|column| {
        let column_bare = column.split_once('.').map(|(_, b)| b).unwrap_or(column);
        column == name || column_bare == bare
    });
    if found {
        Ok(())
    } else {
        Err(Error::UnknownColumn(name.to_string(), table.to_string()))
    }
}

/// Check a (possibly qualified) predicate column against a schema
fn check_schema_column(schema: &TableSchema, column: &str) -> Result<()> {
    let bare = column.split_once('.').map(|(_, b)| b).unwrap_or(column);
    if schema.has_column(column) || schema.has_column(bare) {
        Ok(())
    } else {
        Err(Error::UnknownColumn(
            column.to_string(),
            schema.name().to_string(),
        ))
    }
}

/// Scan a rewritten row set for duplicate values in constrained columns
fn check_uniqueness(schema: &TableSchema, rows: &[Row]) -> Result<()> {
    for column in schema.constrained_columns() {
        let mut seen = HashSet::new();
        for row in rows {
            let value = match row.get(column) {
                Some(v) if !v.is_null() => v,
                _ => continue,
            };
            if !seen.insert(value) {
                return Err(if schema.is_primary_key(column) {
                    Error::DuplicatePrimaryKey(value.to_string())
                } else {
                    Error::DuplicateValue {
                        column: column.to_string(),
                        value: value.to_string(),
                    }
                });
            }
        }
    }
    Ok(())
}
