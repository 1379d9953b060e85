//! Database aggregate
//!
//! `Database` ties the three stores together: the schema catalog, the row
//! store, and the index catalog. Every mutation keeps all three in step —
//! a table exists in all of them or in none, and indexes always describe
//! the current row sequence.

use crate::catalog::{Column, SchemaCatalog, TableSchema};
use crate::error::{Error, Result};
use crate::index::IndexCatalog;
use crate::storage::{Row, RowStore};
use serde::{Deserialize, Serialize};

/// The in-memory database: schemas, rows, and indexes
#[derive(Debug, Clone, Default)]
pub struct Database {
    schemas: SchemaCatalog,
    store: RowStore,
    indexes: IndexCatalog,
}

/// Serialization proxy for snapshots. Indexes are derived state and are
/// rebuilt from schemas and rows on restore rather than persisted.
#[derive(Serialize, Deserialize)]
struct DatabaseData {
    schemas: SchemaCatalog,
    data: RowStore,
}

impl Database {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table: register the schema, an empty row sequence, and a
    /// hash index per constrained column
    pub fn create_table(
        &mut self,
        name: &str,
        columns: Vec<Column>,
        primary_key: Option<String>,
        unique_columns: Vec<String>,
    ) -> Result<()> {
        self.schemas
            .create_table(name, columns, primary_key, unique_columns)?;
        self.store.create_table(name)?;

        let schema = self.schemas.get(name)?;
        let constrained: Vec<String> = schema
            .constrained_columns()
            .into_iter()
            .map(String::from)
            .collect();
        for column in constrained {
            self.indexes.create_index(name, column, true)?;
        }
        Ok(())
    }

    /// Drop a table from all three stores
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.schemas.drop_table(name)?;
        self.store.drop_table(name)?;
        self.indexes.drop_table(name);
        Ok(())
    }

    /// Validate a candidate row, enforce uniqueness, and append it.
    ///
    /// Duplicates are detected against the indexes before the row is
    /// appended, so a rejected insert leaves the table untouched.
    pub fn insert_row(&mut self, table: &str, candidate: &Row) -> Result<()> {
        let schema = self.schemas.get(table)?;
        let row = schema.validate_row(candidate)?;

        for column in schema.constrained_columns() {
            let value = match row.get(column) {
                Some(v) if !v.is_null() => v,
                _ => continue,
            };
            if let Some(index) = self.indexes.get(table, column) {
                if !index.lookup(value).is_empty() {
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

        let position = self.store.insert(table, row.clone())?;
        self.indexes.add_row(table, &row, position)?;
        Ok(())
    }

    /// Swap a table's entire row sequence and rebuild its indexes
    pub fn replace_rows(&mut self, table: &str, rows: Vec<Row>) -> Result<()> {
        self.store.replace_all(table, rows)?;
        let rows = self.store.all_rows(table)?.to_vec();
        self.indexes.rebuild_all_for_table(table, &rows)?;
        Ok(())
    }

    /// The full row sequence for a table
    pub fn rows(&self, table: &str) -> Result<&[Row]> {
        self.store.all_rows(table)
    }

    /// Get a table's schema
    pub fn schema(&self, table: &str) -> Result<&TableSchema> {
        self.schemas.get(table)
    }

    /// Check if a table exists
    pub fn contains_table(&self, table: &str) -> bool {
        self.schemas.contains(table)
    }

    /// Table names in creation order
    pub fn table_names(&self) -> Vec<&str> {
        self.schemas.table_names()
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        self.store.row_count(table)
    }

    /// The index catalog (read-only)
    pub fn indexes(&self) -> &IndexCatalog {
        &self.indexes
    }

    /// Get table schema info as a formatted string (for .schema command)
    pub fn describe(&self, table: &str) -> Result<String> {
        let schema = self.schemas.get(table)?;
        let mut info = format!("Table: {}\n", schema.name());
        info.push_str("Columns:\n");

        for col in schema.columns() {
            let mut flags = Vec::new();
            if schema.is_primary_key(&col.name) {
                flags.push("PRIMARY KEY");
            }
            if !col.nullable && !schema.is_primary_key(&col.name) {
                flags.push("NOT NULL");
            }
            if schema.unique_columns().contains(&col.name) {
                flags.push("UNIQUE");
            }

            let flags_str = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };

            info.push_str(&format!("  {} {}{}\n", col.name, col.data_type, flags_str));
        }

        let indexed = self.indexes.indexed_columns(table);
        if !indexed.is_empty() {
            info.push_str("Indexes:\n");
            for column in indexed {
                info.push_str(&format!("  {}.{} UNIQUE\n", table, column));
            }
        }

        info.push_str(&format!("Rows: {}\n", self.store.row_count(table)?));
        Ok(info)
    }
}

impl Serialize for Database {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DatabaseData {
            schemas: self.schemas.clone(),
            data: self.store.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Database {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = DatabaseData::deserialize(deserializer)?;
        Database::from_parts(data.schemas, data.data).map_err(serde::de::Error::custom)
    }
}

impl Database {
    /// Reassemble a database from persisted schemas and rows, rebuilding
    /// every index
    fn from_parts(schemas: SchemaCatalog, store: RowStore) -> Result<Self> {
        let mut indexes = IndexCatalog::new();
        for table in schemas.table_names() {
            let schema = schemas.get(table)?;
            for column in schema.constrained_columns() {
                indexes.create_index(table, column, true)?;
            }
            let rows = store.all_rows(table)?;
            indexes.rebuild_all_for_table(table, rows)?;
        }
        Ok(Self {
            schemas,
            store,
            indexes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::storage::Value;

    fn users_db() -> Database {
        let mut db = Database::new();
        db.create_table(
            "users",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("email", DataType::Varchar(Some(50))),
            ],
            Some("id".to_string()),
            vec!["email".to_string()],
        )
        .unwrap();
        db
    }

    fn user(id: i64, email: &str) -> Row {
        let mut row = Row::new();
        row.set("id", Value::Integer(id));
        row.set("email", Value::Text(email.to_string()));
        row
    }

    #[test]
    fn test_create_table_registers_indexes() {
        let db = users_db();
        assert!(db.contains_table("users"));
        assert!(db.indexes().get("users", "id").is_some());
        assert!(db.indexes().get("users", "email").is_some());
        assert!(db.indexes().get("users", "name").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicates_without_appending() {
        let mut db = users_db();
        db.insert_row("users", &user(1, "a@x")).unwrap();

        assert!(matches!(
            db.insert_row("users", &user(1, "b@x")),
            Err(Error::DuplicatePrimaryKey(_))
        ));
        assert!(matches!(
            db.insert_row("users", &user(2, "a@x")),
            Err(Error::DuplicateValue { .. })
        ));
        // Failed inserts leave no partial state behind
        assert_eq!(db.row_count("users").unwrap(), 1);
        db.insert_row("users", &user(2, "b@x")).unwrap();
        assert_eq!(db.row_count("users").unwrap(), 2);
    }

    #[test]
    fn test_unique_column_allows_multiple_nulls() {
        let mut db = users_db();
        let mut a = Row::new();
        a.set("id", Value::Integer(1));
        let mut b = Row::new();
        b.set("id", Value::Integer(2));

        db.insert_row("users", &a).unwrap();
        db.insert_row("users", &b).unwrap();
        assert_eq!(db.row_count("users").unwrap(), 2);
    }

    #[test]
    fn test_replace_rows_rebuilds_indexes() {
        let mut db = users_db();
        db.insert_row("users", &user(1, "a@x")).unwrap();
        db.insert_row("users", &user(2, "b@x")).unwrap();

        let survivors = vec![db.rows("users").unwrap()[1].clone()];
        db.replace_rows("users", survivors).unwrap();

        let index = db.indexes().get("users", "id").unwrap();
        assert_eq!(index.lookup(&Value::Integer(2)), &[0]);
        assert_eq!(index.lookup(&Value::Integer(1)), &[] as &[usize]);
        // Freed key is usable again
        db.insert_row("users", &user(1, "a@x")).unwrap();
    }

    #[test]
    fn test_drop_table_clears_everything() {
        let mut db = users_db();
        db.drop_table("users").unwrap();
        assert!(!db.contains_table("users"));
        assert!(db.rows("users").is_err());
        assert!(db.indexes().get("users", "id").is_none());
        assert!(matches!(
            db.drop_table("users"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_describe_format() {
        let mut db = users_db();
        db.insert_row("users", &user(1, "a@x")).unwrap();

        let info = db.describe("users").unwrap();
        assert!(info.starts_with("Table: users\n"));
        assert!(info.contains("  id INTEGER [PRIMARY KEY]\n"));
        assert!(info.contains("  email VARCHAR(50) [UNIQUE]\n"));
        assert!(info.contains("Rows: 1\n"));
    }

    #[test]
    fn test_serde_round_trip_rebuilds_indexes() {
        let mut db = users_db();
        db.insert_row("users", &user(1, "a@x")).unwrap();

        let json = serde_json::to_string(&db).unwrap();
        let mut restored: Database = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.row_count("users").unwrap(), 1);
        // Indexes are live again after restore
        assert!(matches!(
            restored.insert_row("users", &user(1, "z@x")),
            Err(Error::DuplicatePrimaryKey(_))
        ));
    }
}
