//! Catalog module
//!
//! This module contains table schemas, data types, and the schema registry.

pub mod schema;
pub mod types;

pub use schema::{Column, SchemaCatalog, TableSchema};
pub use types::DataType;
