//! Snapshot persistence
//!
//! The whole database serializes to a single JSON document: table schemas
//! plus every row sequence. Indexes are not persisted; they are rebuilt
//! when a snapshot loads. A snapshot is written after every successful
//! mutation and read once at startup.

use crate::database::Database;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where snapshots go and how they come back
pub trait SnapshotStore {
    /// Persist the full database state
    fn save(&self, database: &Database) -> Result<()>;

    /// Load the persisted state. `Ok(None)` means nothing has been saved
    /// yet and the caller should start fresh.
    fn load(&self) -> Result<Option<Database>>;
}

/// Snapshot store backed by a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    /// Create a snapshot store writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshot {
    fn save(&self, database: &Database) -> Result<()> {
        let json = serde_json::to_string_pretty(database)
            .map_err(|e| Error::SnapshotError(format!("serialization failed: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Database>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let database = serde_json::from_str(&json).map_err(|e| {
            Error::SnapshotError(format!(
                "cannot read snapshot '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::storage::{Row, Value};

    fn sample_database() -> Database {
        let mut db = Database::new();
        db.create_table(
            "users",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("name", DataType::Varchar(Some(20))),
            ],
            Some("id".to_string()),
            vec![],
        )
        .unwrap();
        let mut row = Row::new();
        row.set("id", Value::Integer(1));
        row.set("name", Value::Text("John".to_string()));
        db.insert_row("users", &row).unwrap();
        db
    }

    #[test]
    fn test_missing_file_loads_as_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshot::new(dir.path().join("db.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshot::new(dir.path().join("db.json"));

        store.save(&sample_database()).unwrap();
        let restored = store.load().unwrap().expect("snapshot should exist");

        assert_eq!(restored.table_names(), vec!["users"]);
        assert_eq!(restored.row_count("users").unwrap(), 1);
        let row = &restored.rows("users").unwrap()[0];
        assert_eq!(row.get("name"), Some(&Value::Text("John".to_string())));
    }

    #[test]
    fn test_snapshot_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonSnapshot::new(&path);
        store.save(&sample_database()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"]["users"][0]["id"], 1);
        // Pretty-printed, not a single line
        assert!(text.lines().count() > 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonSnapshot::new(&path);
        assert!(matches!(store.load(), Err(Error::SnapshotError(_))));
    }
}
