//! SQL front end
//!
//! This module contains the lexer, parser, and statement descriptors.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    Assignment, ColumnDef, CompareOp, CreateTableStatement, DeleteStatement, DropTableStatement,
    InsertStatement, JoinClause, OrderBy, Predicate, Projection, SelectStatement, Statement,
    UpdateStatement,
};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;
