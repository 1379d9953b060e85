//! Storage module
//!
//! This module contains the in-memory storage components:
//! - Typed values and rows
//! - The per-table row store

pub mod row;
pub mod store;

pub use row::{Row, Value};
pub use store::RowStore;
