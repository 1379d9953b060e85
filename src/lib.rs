//! OpalDB - A minimal in-memory relational database engine
//!
//! This library provides the core components of the engine:
//! - SQL parsing (lexer, parser, statement descriptors)
//! - In-memory storage (rows, row store, hash indexes)
//! - Schema catalog and type coercion
//! - Statement execution
//! - JSON snapshot persistence
//! - HTTP/JSON server

pub mod catalog;
pub mod database;
pub mod error;
pub mod executor;
pub mod index;
pub mod server;
pub mod snapshot;
pub mod sql;
pub mod storage;

pub use error::{Error, Result};
