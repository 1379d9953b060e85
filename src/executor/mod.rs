//! Query execution module
//!
//! This module contains the statement executor and its result type.

pub mod executor;
pub mod result;

pub use executor::QueryExecutor;
pub use result::ExecutionResult;
