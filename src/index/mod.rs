//! Hash indexes for OpalDB
//!
//! One hash index per constrained column: a mapping from a cell value to
//! the ordered row positions currently holding it. NULL values are never
//! indexed, so a unique column admits any number of NULLs. After every
//! whole-table rewrite the owning table's indexes are rebuilt from the
//! new row sequence; positions are never patched in place.

use crate::error::{Error, Result};
use crate::storage::{Row, Value};
use std::collections::HashMap;

/// A single-column hash index
#[derive(Debug, Clone)]
pub struct HashIndex {
    table: String,
    column: String,
    unique: bool,
    entries: HashMap<Value, Vec<usize>>,
}

impl HashIndex {
    /// Create an empty index
    pub fn new(table: impl Into<String>, column: impl Into<String>, unique: bool) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            unique,
            entries: HashMap::new(),
        }
    }

    /// Table this index belongs to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Indexed column
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Is this a unique index?
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Rebuild from scratch over a row sequence
    pub fn build(&mut self, rows: &[Row]) -> Result<()> {
        self.entries.clear();
        for (position, row) in rows.iter().enumerate() {
            if let Some(value) = row.get(&self.column) {
                self.add(value.clone(), position)?;
            }
        }
        Ok(())
    }

    /// Record a position for a value. NULL is never recorded; a unique
    /// index rejects a value that already has a position.
    pub fn add(&mut self, value: Value, position: usize) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        if self.unique {
            if let Some(existing) = self.entries.get(&value) {
                if !existing.is_empty() {
                    return Err(Error::UniqueViolation {
                        column: self.column.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        self.entries.entry(value).or_default().push(position);
        Ok(())
    }

    /// Forget a position for a value; a key with no positions left is
    /// dropped entirely.
    pub fn remove(&mut self, value: &Value, position: usize) {
        if let Some(positions) = self.entries.get_mut(value) {
            positions.retain(|&p| p != position);
            if positions.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Positions currently holding a value, in insertion order
    pub fn lookup(&self, value: &Value) -> &[usize] {
        self.entries
            .get(value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The full value → positions mapping
    pub fn entries(&self) -> &HashMap<Value, Vec<usize>> {
        &self.entries
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of hash indexes, keyed by table then column
#[derive(Debug, Clone, Default)]
pub struct IndexCatalog {
    indexes: HashMap<String, HashMap<String, HashIndex>>,
}

impl IndexCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            indexes: HashMap::new(),
        }
    }

    /// Register an empty index on a table column
    pub fn create_index(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        unique: bool,
    ) -> Result<()> {
        let table = table.into();
        let column = column.into();
        let table_indexes = self.indexes.entry(table.clone()).or_default();
        if table_indexes.contains_key(&column) {
            return Err(Error::IndexAlreadyExists(table, column));
        }
        table_indexes.insert(column.clone(), HashIndex::new(table, column, unique));
        Ok(())
    }

    /// Get the index on a table column, if one exists
    pub fn get(&self, table: &str, column: &str) -> Option<&HashIndex> {
        self.indexes.get(table).and_then(|cols| cols.get(column))
    }

    /// All indexes on a table
    pub fn table_indexes(&self, table: &str) -> Vec<&HashIndex> {
        self.indexes
            .get(table)
            .map(|cols| cols.values().collect())
            .unwrap_or_default()
    }

    /// Names of indexed columns on a table
    pub fn indexed_columns(&self, table: &str) -> Vec<&str> {
        self.indexes
            .get(table)
            .map(|cols| cols.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Record a freshly appended row at its position in every index on
    /// the table
    pub fn add_row(&mut self, table: &str, row: &Row, position: usize) -> Result<()> {
        if let Some(cols) = self.indexes.get_mut(table) {
            for index in cols.values_mut() {
                if let Some(value) = row.get(index.column()) {
                    index.add(value.clone(), position)?;
                }
            }
        }
        Ok(())
    }

    /// Drop and rebuild every index on a table from the current row
    /// sequence
    pub fn rebuild_all_for_table(&mut self, table: &str, rows: &[Row]) -> Result<()> {
        if let Some(cols) = self.indexes.get_mut(table) {
            for index in cols.values_mut() {
                index.build(rows)?;
            }
        }
        Ok(())
    }

    /// Discard all indexes for a table
    pub fn drop_table(&mut self, table: &str) {
        self.indexes.remove(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(column: &str, value: Value) -> Row {
        let mut row = Row::new();
        row.set(column, value);
        row
    }

    #[test]
    fn test_build_and_lookup() {
        let rows = vec![
            row("email", Value::Text("a@x".into())),
            row("email", Value::Text("b@x".into())),
            row("email", Value::Text("a@x".into())),
        ];
        let mut index = HashIndex::new("users", "email", false);
        index.build(&rows).unwrap();

        assert_eq!(index.lookup(&Value::Text("a@x".into())), &[0, 2]);
        assert_eq!(index.lookup(&Value::Text("b@x".into())), &[1]);
        assert_eq!(index.lookup(&Value::Text("c@x".into())), &[] as &[usize]);
    }

    #[test]
    fn test_nulls_are_never_indexed() {
        let rows = vec![
            row("email", Value::Null),
            row("email", Value::Text("a@x".into())),
            row("email", Value::Null),
        ];
        let mut index = HashIndex::new("users", "email", true);
        // Two NULLs do not violate uniqueness
        index.build(&rows).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(&Value::Null), &[] as &[usize]);
    }

    #[test]
    fn test_unique_violation_on_build_and_add() {
        let rows = vec![row("id", Value::Integer(1)), row("id", Value::Integer(1))];
        let mut index = HashIndex::new("users", "id", true);
        assert!(matches!(
            index.build(&rows),
            Err(Error::UniqueViolation { .. })
        ));

        let mut index = HashIndex::new("users", "id", true);
        index.add(Value::Integer(1), 0).unwrap();
        assert!(matches!(
            index.add(Value::Integer(1), 1),
            Err(Error::UniqueViolation { .. })
        ));
    }

    #[test]
    fn test_remove_drops_empty_keys() {
        let mut index = HashIndex::new("users", "city", false);
        index.add(Value::Text("Oslo".into()), 0).unwrap();
        index.add(Value::Text("Oslo".into()), 1).unwrap();

        index.remove(&Value::Text("Oslo".into()), 0);
        assert_eq!(index.lookup(&Value::Text("Oslo".into())), &[1]);

        index.remove(&Value::Text("Oslo".into()), 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_incremental_matches_rebuild() {
        // After interleaved add/remove cycles the mapping must be exactly
        // what a from-scratch build over the surviving rows produces.
        let mut live = HashIndex::new("t", "v", false);
        let mut rows = Vec::new();
        for i in 0..6i64 {
            let r = row("v", Value::Integer(i % 3));
            live.add(Value::Integer(i % 3), rows.len()).unwrap();
            rows.push(r);
        }
        // Drop positions 1 and 4, then recompact the way a rewrite would
        live.remove(&Value::Integer(1), 1);
        live.remove(&Value::Integer(1), 4);
        rows.remove(4);
        rows.remove(1);
        let mut rebuilt = HashIndex::new("t", "v", false);
        rebuilt.build(&rows).unwrap();
        // Incremental positions are stale after removal, which is exactly
        // why mutations rebuild rather than patch
        assert_ne!(live.entries(), rebuilt.entries());
        live.build(&rows).unwrap();
        assert_eq!(live.entries(), rebuilt.entries());
    }

    #[test]
    fn test_catalog_registry() {
        let mut catalog = IndexCatalog::new();
        catalog.create_index("users", "id", true).unwrap();
        catalog.create_index("users", "email", true).unwrap();
        assert!(matches!(
            catalog.create_index("users", "id", true),
            Err(Error::IndexAlreadyExists(_, _))
        ));

        assert_eq!(catalog.table_indexes("users").len(), 2);
        assert!(catalog.get("users", "id").is_some());
        assert!(catalog.get("users", "name").is_none());

        catalog.drop_table("users");
        assert!(catalog.table_indexes("users").is_empty());
    }

    #[test]
    fn test_catalog_add_row_and_rebuild() {
        let mut catalog = IndexCatalog::new();
        catalog.create_index("users", "id", true).unwrap();

        let mut r = Row::new();
        r.set("id", Value::Integer(1));
        r.set("name", Value::Text("John".into()));
        catalog.add_row("users", &r, 0).unwrap();
        assert_eq!(catalog.get("users", "id").unwrap().lookup(&Value::Integer(1)), &[0]);

        let mut r2 = Row::new();
        r2.set("id", Value::Integer(2));
        r2.set("name", Value::Text("Jane".into()));
        catalog
            .rebuild_all_for_table("users", &[r2.clone()])
            .unwrap();
        let index = catalog.get("users", "id").unwrap();
        assert_eq!(index.lookup(&Value::Integer(2)), &[0]);
        assert_eq!(index.lookup(&Value::Integer(1)), &[] as &[usize]);
    }
}
