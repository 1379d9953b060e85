//! SQL Parser
//!
//! This module parses SQL tokens into a statement descriptor. The parser
//! is the gate for the engine's deliberate restrictions: one optional
//! predicate per statement (no AND/OR), inner joins only, one row per
//! INSERT. Anything outside that surface is rejected here with a targeted
//! message rather than reaching the executor.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};
use crate::storage::Value;

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single SQL statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        Ok(stmt)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            _ => Err(Error::UnexpectedToken {
                expected: "CREATE, DROP, INSERT, SELECT, UPDATE, or DELETE".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== CREATE TABLE ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        // At most one primary key per table
        if columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::ParseError(format!(
                "table '{}' declares more than one PRIMARY KEY column",
                table_name
            )));
        }

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut not_null = false;
        let mut primary_key = false;
        let mut unique = false;

        // Parse column constraints
        loop {
            if self.check(&Token::Not) {
                self.advance();
                self.expect(&Token::Null)?;
                not_null = true;
            } else if self.check(&Token::Null) {
                self.advance();
                // NULL is allowed (default)
            } else if self.check(&Token::Primary) {
                self.advance();
                self.expect(&Token::Key)?;
                primary_key = true;
                not_null = true;
            } else if self.check(&Token::Unique) {
                self.advance();
                unique = true;
            } else {
                break;
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            not_null,
            primary_key,
            unique,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let dt = match self.current() {
            Token::Int | Token::Integer => {
                self.advance();
                DataType::Integer
            }
            Token::Float => {
                self.advance();
                DataType::Float
            }
            Token::Boolean => {
                self.advance();
                DataType::Boolean
            }
            Token::Varchar => {
                self.advance();
                if self.check(&Token::LParen) {
                    self.advance();
                    let len = self.expect_integer()?;
                    if len <= 0 {
                        return Err(Error::ParseError(format!(
                            "VARCHAR length must be positive, got {}",
                            len
                        )));
                    }
                    self.expect(&Token::RParen)?;
                    DataType::Varchar(Some(len as usize))
                } else {
                    DataType::Varchar(None)
                }
            }
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "data type".to_string(),
                    found: format!("{}", self.current()),
                });
            }
        };

        Ok(dt)
    }

    // ========== DROP TABLE ==========

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;

        let table_name = self.expect_identifier()?;

        Ok(DropTableStatement { table_name })
    }

    // ========== INSERT ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        // Optional column list
        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;

        self.expect(&Token::LParen)?;
        let values = self.parse_value_list()?;
        self.expect(&Token::RParen)?;

        if self.check(&Token::Comma) {
            return Err(Error::ParseError(
                "multi-row VALUES is not supported; insert one row per statement".to_string(),
            ));
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let projection = self.parse_projection()?;

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;

        let join = if self.check(&Token::Inner)
            || self.check(&Token::Join)
            || self.check(&Token::Left)
            || self.check(&Token::Right)
            || self.check(&Token::Outer)
            || self.check(&Token::Full)
        {
            Some(self.parse_join(&table_name)?)
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;

        let order_by = if self.check(&Token::Order) {
            self.advance();
            self.expect(&Token::By)?;
            let column = self.parse_column_ref()?;
            let ascending = if self.check(&Token::Desc) {
                self.advance();
                false
            } else {
                if self.check(&Token::Asc) {
                    self.advance();
                }
                true
            };
            Some(OrderBy { column, ascending })
        } else {
            None
        };

        let limit = if self.check(&Token::Limit) {
            self.advance();
            let n = self.expect_integer()?;
            if n < 0 {
                return Err(Error::ParseError(format!(
                    "LIMIT must be non-negative, got {}",
                    n
                )));
            }
            Some(n as usize)
        } else {
            None
        };

        Ok(SelectStatement {
            table_name,
            projection,
            join,
            where_clause,
            order_by,
            limit,
        })
    }

    fn parse_projection(&mut self) -> Result<Projection> {
        if self.check(&Token::Asterisk) {
            self.advance();
            return Ok(Projection::All);
        }

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_ref()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(Projection::Columns(columns))
    }

    fn parse_join(&mut self, from_table: &str) -> Result<JoinClause> {
        if self.check(&Token::Inner) {
            self.advance();
        } else if self.check(&Token::Left)
            || self.check(&Token::Right)
            || self.check(&Token::Outer)
            || self.check(&Token::Full)
        {
            return Err(Error::ParseError(
                "only INNER JOIN is supported".to_string(),
            ));
        }
        self.expect(&Token::Join)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::On)?;
        let first = self.parse_qualified_ref()?;
        self.expect(&Token::Eq)?;
        let second = self.parse_qualified_ref()?;

        // Normalize so the left column belongs to the FROM table: when the
        // ON sides carry table qualifiers, `ON b.y = a.x` and
        // `ON a.x = b.y` parse identically.
        let (left, right) = match (&first.0, &second.0) {
            (Some(q), _) if q == &table_name => (second, first),
            (_, Some(q)) if q == from_table => (second, first),
            _ => (first, second),
        };

        Ok(JoinClause {
            table_name,
            left_column: left.1,
            right_column: right.1,
        })
    }

    fn parse_optional_where(&mut self) -> Result<Option<Predicate>> {
        if !self.check(&Token::Where) {
            return Ok(None);
        }
        self.advance();

        let column = self.parse_column_ref()?;
        let op = self.parse_compare_op()?;
        let value = self.parse_value()?;

        // Exactly one predicate per statement
        if self.check(&Token::And) || self.check(&Token::Or) {
            return Err(Error::ParseError(
                "AND/OR are not supported; use a single WHERE predicate".to_string(),
            ));
        }

        Ok(Some(Predicate { column, op, value }))
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp> {
        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::Neq,
            Token::Lt => CompareOp::Lt,
            Token::Gt => CompareOp::Gt,
            Token::Lte => CompareOp::Lte,
            Token::Gte => CompareOp::Gte,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "comparison operator".to_string(),
                    found: format!("{}", self.current()),
                });
            }
        };
        self.advance();
        Ok(op)
    }

    // ========== UPDATE ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_value()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_optional_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;

        let table_name = self.expect_identifier()?;

        let where_clause = self.parse_optional_where()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== Values and references ==========

    /// Parse a literal into a typed value
    fn parse_value(&mut self) -> Result<Value> {
        let value = match self.current().clone() {
            Token::IntegerLiteral(n) => Value::Integer(n),
            Token::FloatLiteral(n) => Value::Float(n),
            Token::StringLiteral(s) => Value::Text(s),
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            Token::Null => Value::Null,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "literal value".to_string(),
                    found: format!("{}", self.current()),
                });
            }
        };
        self.advance();
        Ok(value)
    }

    fn parse_value_list(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();

        loop {
            values.push(self.parse_value()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(values)
    }

    /// Parse a column reference, keeping any `table.` qualifier in the
    /// returned name
    fn parse_column_ref(&mut self) -> Result<String> {
        let (qualifier, column) = self.parse_qualified_ref()?;
        Ok(match qualifier {
            Some(table) => format!("{}.{}", table, column),
            None => column,
        })
    }

    /// Parse `column` or `table.column` into its two parts
    fn parse_qualified_ref(&mut self) -> Result<(Option<String>, String)> {
        let first = self.expect_identifier()?;

        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier()?;
            Ok((Some(first), column))
        } else {
            Ok((None, first))
        }
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    // ========== Helper functions ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("{}", token),
                found: format!("{}", self.current()),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(Error::UnexpectedToken {
                expected: "identifier".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(Error::UnexpectedToken {
                expected: "integer".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }
}
