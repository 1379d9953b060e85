//! Row storage for OpalDB
//!
//! The row store owns the ordered row sequence for every table. A row has
//! no identity beyond its position in the sequence; those positions are
//! what indexes record, so any whole-sequence replacement invalidates
//! every index on the table.

use crate::error::{Error, Result};
use crate::storage::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// In-memory row storage: one ordered row sequence per table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowStore {
    tables: IndexMap<String, Vec<Row>>,
}

impl RowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    /// Register a table with an empty row sequence
    pub fn create_table(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        self.tables.insert(name, Vec::new());
        Ok(())
    }

    /// Discard a table's row sequence
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists in the store
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Append a row, returning its new position
    pub fn insert(&mut self, name: &str, row: Row) -> Result<usize> {
        let rows = self
            .tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        rows.push(row);
        Ok(rows.len() - 1)
    }

    /// The full row sequence for a table
    pub fn all_rows(&self, name: &str) -> Result<&[Row]> {
        self.tables
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Swap a table's entire row sequence. Every previously returned
    /// position is invalid afterwards; callers rebuild the table's
    /// indexes before returning.
    pub fn replace_all(&mut self, name: &str, rows: Vec<Row>) -> Result<()> {
        let slot = self
            .tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        *slot = rows;
        Ok(())
    }

    /// Number of rows in a table
    pub fn row_count(&self, name: &str) -> Result<usize> {
        Ok(self.all_rows(name)?.len())
    }

    /// Iterate over (table, rows) in table creation order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Row>)> {
        self.tables.iter()
    }
}
