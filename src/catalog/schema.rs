//! Schema definitions for OpalDB
//!
//! This module defines table schemas, column metadata, and the schema
//! catalog that validates candidate rows against them.

use super::types::DataType;
use crate::error::{Error, Result};
use crate::storage::{Row, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this column nullable?
    pub nullable: bool,
}

impl Column {
    /// Create a new nullable column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Table schema - defines the structure of a table
///
/// Columns are ordered; the primary key and unique constraints reference
/// columns by name. Immutable once registered in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    name: String,
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
    /// Primary key column, if any
    primary_key: Option<String>,
    /// Unique-constraint columns (primary key not repeated here)
    unique_columns: Vec<String>,
}

impl TableSchema {
    /// Create a schema, checking that column names are unique and that
    /// the primary key and unique constraints reference real columns.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        primary_key: Option<String>,
        unique_columns: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        let mut name_to_index = HashMap::new();
        for (index, column) in columns.iter().enumerate() {
            if name_to_index.insert(column.name.clone(), index).is_some() {
                return Err(Error::InvalidDefinition(format!(
                    "duplicate column '{}' in table '{}'",
                    column.name, name
                )));
            }
        }
        if let Some(pk) = &primary_key {
            if !name_to_index.contains_key(pk) {
                return Err(Error::InvalidDefinition(format!(
                    "primary key column '{}' is not defined in table '{}'",
                    pk, name
                )));
            }
        }
        let mut uniques = Vec::new();
        for column in unique_columns {
            if !name_to_index.contains_key(&column) {
                return Err(Error::InvalidDefinition(format!(
                    "unique column '{}' is not defined in table '{}'",
                    column, name
                )));
            }
            if primary_key.as_deref() != Some(column.as_str()) && !uniques.contains(&column) {
                uniques.push(column);
            }
        }
        Ok(Self {
            name,
            columns,
            name_to_index,
            primary_key,
            unique_columns: uniques,
        })
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Primary key column name, if any
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Unique-constraint columns (without the primary key)
    pub fn unique_columns(&self) -> &[String] {
        &self.unique_columns
    }

    /// Columns that carry a uniqueness constraint: the primary key first,
    /// then each UNIQUE column. These are the indexed columns.
    pub fn constrained_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        if let Some(pk) = &self.primary_key {
            columns.push(pk.as_str());
        }
        for unique in &self.unique_columns {
            columns.push(unique.as_str());
        }
        columns
    }

    /// Check whether a column is the primary key
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.as_deref() == Some(column)
    }

    /// Validate a candidate row against this schema, producing a
    /// fully-typed row in schema column order.
    ///
    /// Unknown columns are rejected first; absent columns become NULL;
    /// present values are coerced to the declared type; VARCHAR values
    /// are then length-checked (in characters). NULL in the primary key
    /// or a NOT NULL column fails.
    pub fn validate_row(&self, candidate: &Row) -> Result<Row> {
        for column in candidate.columns() {
            if !self.has_column(column) {
                return Err(Error::UnknownColumn(
                    column.to_string(),
                    self.name.clone(),
                ));
            }
        }

        let mut row = Row::new();
        for column in &self.columns {
            let value = candidate.get(&column.name).cloned().unwrap_or(Value::Null);
            if value.is_null() {
                if self.is_primary_key(&column.name) {
                    return Err(Error::NullPrimaryKey(column.name.clone()));
                }
                if !column.nullable {
                    return Err(Error::NullNotAllowed(column.name.clone()));
                }
                row.set(column.name.clone(), Value::Null);
                continue;
            }
            let typed = column.data_type.coerce(&value).ok_or_else(|| Error::TypeMismatch {
                column: column.name.clone(),
                expected: column.data_type.to_string(),
                got: value.type_name().to_string(),
            })?;
            if let (Some(max), Value::Text(text)) = (column.data_type.max_length(), &typed) {
                if text.chars().count() > max {
                    return Err(Error::LengthExceeded {
                        column: column.name.clone(),
                        max,
                    });
                }
            }
            row.set(column.name.clone(), typed);
        }
        Ok(row)
    }
}

/// The schema catalog: registry of all table schemas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    /// Register a new table schema
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        columns: Vec<Column>,
        primary_key: Option<String>,
        unique_columns: Vec<String>,
    ) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        let schema = TableSchema::new(name.clone(), columns, primary_key, unique_columns)?;
        self.tables.insert(name, schema);
        Ok(())
    }

    /// Remove a table schema
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table schema
    pub fn get(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in creation order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get a column definition
    pub fn get_column(&self, table: &str, column: &str) -> Result<&Column> {
        let schema = self.get(table)?;
        schema
            .get_column(column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string(), table.to_string()))
    }

    /// Validate a candidate row against a table's schema
    pub fn validate_row(&self, table: &str, candidate: &Row) -> Result<Row> {
        self.get(table)?.validate_row(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("name", DataType::Varchar(Some(10))),
                Column::new("active", DataType::Boolean),
            ],
            Some("id".to_string()),
            vec!["name".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_creation() {
        let schema = users_schema();
        assert_eq!(schema.column_count(), 3);
        assert!(schema.has_column("id"));
        assert!(!schema.has_column("unknown"));
        assert_eq!(schema.primary_key(), Some("id"));
        assert_eq!(schema.constrained_columns(), vec!["id", "name"]);
    }

    #[test]
    fn test_invalid_definitions() {
        let duplicate = TableSchema::new(
            "t",
            vec![
                Column::new("a", DataType::Integer),
                Column::new("a", DataType::Integer),
            ],
            None,
            vec![],
        );
        assert!(matches!(duplicate, Err(Error::InvalidDefinition(_))));

        let bad_pk = TableSchema::new(
            "t",
            vec![Column::new("a", DataType::Integer)],
            Some("missing".to_string()),
            vec![],
        );
        assert!(matches!(bad_pk, Err(Error::InvalidDefinition(_))));

        let bad_unique = TableSchema::new(
            "t",
            vec![Column::new("a", DataType::Integer)],
            None,
            vec!["missing".to_string()],
        );
        assert!(matches!(bad_unique, Err(Error::InvalidDefinition(_))));
    }

    #[test]
    fn test_primary_key_not_repeated_in_uniques() {
        let schema = TableSchema::new(
            "t",
            vec![Column::new("id", DataType::Integer)],
            Some("id".to_string()),
            vec!["id".to_string()],
        )
        .unwrap();
        assert!(schema.unique_columns().is_empty());
        assert_eq!(schema.constrained_columns(), vec!["id"]);
    }

    #[test]
    fn test_validate_row_fills_missing_with_null() {
        let schema = users_schema();
        let mut candidate = Row::new();
        candidate.set("id", Value::Integer(1));

        let row = schema.validate_row(&candidate).unwrap();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["id", "name", "active"]);
        assert_eq!(row.get("name"), Some(&Value::Null));
        assert_eq!(row.get("active"), Some(&Value::Null));
    }

    #[test]
    fn test_validate_row_orders_columns_by_schema() {
        let schema = users_schema();
        let mut candidate = Row::new();
        candidate.set("active", Value::Text("yes".to_string()));
        candidate.set("id", Value::Text("7".to_string()));

        let row = schema.validate_row(&candidate).unwrap();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["id", "name", "active"]);
        assert_eq!(row.get("id"), Some(&Value::Integer(7)));
        assert_eq!(row.get("active"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_validate_row_rejections() {
        let schema = users_schema();

        let mut extra = Row::new();
        extra.set("id", Value::Integer(1));
        extra.set("nickname", Value::Text("x".to_string()));
        assert!(matches!(
            schema.validate_row(&extra),
            Err(Error::UnknownColumn(_, _))
        ));

        let mut mismatch = Row::new();
        mismatch.set("id", Value::Text("seven".to_string()));
        assert!(matches!(
            schema.validate_row(&mismatch),
            Err(Error::TypeMismatch { .. })
        ));

        let mut long = Row::new();
        long.set("id", Value::Integer(1));
        long.set("name", Value::Text("name-way-too-long".to_string()));
        assert!(matches!(
            schema.validate_row(&long),
            Err(Error::LengthExceeded { max: 10, .. })
        ));

        let mut null_pk = Row::new();
        null_pk.set("name", Value::Text("x".to_string()));
        assert!(matches!(
            schema.validate_row(&null_pk),
            Err(Error::NullPrimaryKey(_))
        ));
    }

    #[test]
    fn test_not_null_column() {
        let schema = TableSchema::new(
            "t",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("label", DataType::Varchar(None)).nullable(false),
            ],
            Some("id".to_string()),
            vec![],
        )
        .unwrap();

        let mut candidate = Row::new();
        candidate.set("id", Value::Integer(1));
        assert!(matches!(
            schema.validate_row(&candidate),
            Err(Error::NullNotAllowed(_))
        ));
    }

    #[test]
    fn test_catalog_create_and_drop() {
        let mut catalog = SchemaCatalog::new();
        catalog
            .create_table(
                "users",
                vec![Column::new("id", DataType::Integer)],
                Some("id".to_string()),
                vec![],
            )
            .unwrap();

        assert!(catalog.contains("users"));
        let duplicate = catalog.create_table(
            "users",
            vec![Column::new("id", DataType::Integer)],
            None,
            vec![],
        );
        assert!(matches!(duplicate, Err(Error::TableAlreadyExists(_))));

        catalog.drop_table("users").unwrap();
        assert!(matches!(
            catalog.drop_table("users"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_catalog_get_column() {
        let mut catalog = SchemaCatalog::new();
        catalog
            .create_table(
                "users",
                vec![Column::new("id", DataType::Integer)],
                None,
                vec![],
            )
            .unwrap();

        assert!(catalog.get_column("users", "id").is_ok());
        assert!(matches!(
            catalog.get_column("users", "nope"),
            Err(Error::UnknownColumn(_, _))
        ));
        assert!(matches!(
            catalog.get_column("missing", "id"),
            Err(Error::TableNotFound(_))
        ));
    }
}
