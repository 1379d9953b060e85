//! SQL Token definitions
//!
//! This module defines all tokens that can appear in SQL statements.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // DDL Keywords
    Create,
    Drop,
    Table,

    // DML Keywords
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,

    // Clauses
    And,
    Or,
    Not,
    On,
    Join,
    Inner,
    Left,
    Right,
    Outer,
    Full,

    // Ordering
    Order,
    By,
    Asc,
    Desc,
    Limit,

    // Constraints
    Primary,
    Key,
    Unique,
    Null,

    // Data Types
    Int,
    Integer,
    Float,
    Varchar,
    Boolean,

    // Boolean Literals
    True,
    False,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// Float literal
    FloatLiteral(f64),
    /// String literal (single-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, etc.)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Drop
                | Token::Table
                | Token::Select
                | Token::Insert
                | Token::Update
                | Token::Delete
                | Token::Into
                | Token::Values
                | Token::Set
                | Token::From
                | Token::Where
                | Token::And
                | Token::Or
                | Token::Not
                | Token::On
                | Token::Join
                | Token::Inner
                | Token::Left
                | Token::Right
                | Token::Outer
                | Token::Full
                | Token::Order
                | Token::By
                | Token::Asc
                | Token::Desc
                | Token::Limit
                | Token::Primary
                | Token::Key
                | Token::Unique
                | Token::Null
                | Token::Int
                | Token::Integer
                | Token::Float
                | Token::Varchar
                | Token::Boolean
                | Token::True
                | Token::False
        )
    }

    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            // DDL
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "TABLE" => Some(Token::Table),

            // DML
            "SELECT" => Some(Token::Select),
            "INSERT" => Some(Token::Insert),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),

            // Clauses
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "ON" => Some(Token::On),
            "JOIN" => Some(Token::Join),
            "INNER" => Some(Token::Inner),
            "LEFT" => Some(Token::Left),
            "RIGHT" => Some(Token::Right),
            "OUTER" => Some(Token::Outer),
            "FULL" => Some(Token::Full),

            // Ordering
            "ORDER" => Some(Token::Order),
            "BY" => Some(Token::By),
            "ASC" => Some(Token::Asc),
            "DESC" => Some(Token::Desc),
            "LIMIT" => Some(Token::Limit),

            // Constraints
            "PRIMARY" => Some(Token::Primary),
            "KEY" => Some(Token::Key),
            "UNIQUE" => Some(Token::Unique),
            "NULL" => Some(Token::Null),

            // Data Types
            "INT" => Some(Token::Int),
            "INTEGER" => Some(Token::Integer),
            "FLOAT" => Some(Token::Float),
            "VARCHAR" => Some(Token::Varchar),
            "BOOLEAN" => Some(Token::Boolean),

            // Boolean Literals
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),

            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Create => write!(f, "CREATE"),
            Token::Drop => write!(f, "DROP"),
            Token::Table => write!(f, "TABLE"),
            Token::Select => write!(f, "SELECT"),
            Token::Insert => write!(f, "INSERT"),
            Token::Update => write!(f, "UPDATE"),
            Token::Delete => write!(f, "DELETE"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Set => write!(f, "SET"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::On => write!(f, "ON"),
            Token::Join => write!(f, "JOIN"),
            Token::Inner => write!(f, "INNER"),
            Token::Left => write!(f, "LEFT"),
            Token::Right => write!(f, "RIGHT"),
            Token::Outer => write!(f, "OUTER"),
            Token::Full => write!(f, "FULL"),
            Token::Order => write!(f, "ORDER"),
            Token::By => write!(f, "BY"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Primary => write!(f, "PRIMARY"),
            Token::Key => write!(f, "KEY"),
            Token::Unique => write!(f, "UNIQUE"),
            Token::Null => write!(f, "NULL"),
            Token::Int => write!(f, "INT"),
            Token::Integer => write!(f, "INTEGER"),
            Token::Float => write!(f, "FLOAT"),
            Token::Varchar => write!(f, "VARCHAR"),
            Token::Boolean => write!(f, "BOOLEAN"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::IntegerLiteral(n) => write!(f, "{}", n),
            Token::FloatLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Token::from_keyword("SELECT"), Some(Token::Select));
        assert_eq!(Token::from_keyword("select"), Some(Token::Select));
        assert_eq!(Token::from_keyword("SeLeCt"), Some(Token::Select));
        assert_eq!(Token::from_keyword("unknown"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(Token::Select.is_keyword());
        assert!(Token::Unique.is_keyword());
        assert!(!Token::Asterisk.is_keyword());
        assert!(!Token::IntegerLiteral(42).is_keyword());
    }
}
