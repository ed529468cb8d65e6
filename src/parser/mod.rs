//! Query string parsing
//!
//! Translates MongoDB-shell-style query strings into executable commands
//! without evaluating any code. The chain is lexer, expression parser, BSON
//! conversion, with a thin shape-detection layer on top that decides whether
//! the input is a bare pipeline, a `db.collection.op()` call, or a plain
//! filter literal.
//!
//! # Examples
//!
//! ```no_run
//! use mongate::parser::QueryParser;
//!
//! // Parse a shell-style find
//! let parsed = QueryParser::parse("db.movies.find({ year: 1999 })").unwrap();
//!
//! // Parse a bare pipeline
//! let parsed = QueryParser::parse(r#"[{ "$match": { "year": 2000 } }]"#).unwrap();
//! ```

pub mod ast;
pub mod command;
pub mod convert;
pub mod extract;
pub mod grammar;
pub mod lexer;

// Re-export public API
pub use command::{FindSpec, ParsedCommand, ParsedQuery, QueryEnvelope};

use mongodb::bson::{Bson, Document};

use crate::error::{ParseError, Result};
use crate::parser::ast::{ArrayExpr, Expr};
use crate::parser::convert::ExpressionConverter;
use crate::parser::extract::DbCallParser;
use crate::parser::grammar::ExprParser;

/// Entry point for query translation.
///
/// Detection runs in order: a bracketed input is a pipeline literal, a
/// `db.`-prefixed input is a shell call, anything else is treated as a bare
/// literal (object filter or pipeline array). Whichever branch matches owns
/// the input; there is no fallback on error.
pub struct QueryParser;

impl QueryParser {
    /// Parse an input string into a [`ParsedQuery`].
    pub fn parse(input: &str) -> Result<ParsedQuery> {
        let trimmed = Self::trim_input(input);

        // Handle empty input
        if trimmed.is_empty() {
            return Err(ParseError::EmptyQuery.into());
        }

        // Check if it's a bare pipeline literal
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            return Self::parse_pipeline_literal(trimmed);
        }

        // Check if it's a database call (db.collection.operation)
        if trimmed.starts_with("db.") || trimmed.starts_with("db[") {
            return DbCallParser::parse(trimmed);
        }

        Self::parse_generic_literal(trimmed)
    }

    /// Strip surrounding whitespace and at most one trailing semicolon.
    fn trim_input(input: &str) -> &str {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
        trimmed.trim_end()
    }

    fn parse_pipeline_literal(input: &str) -> Result<ParsedQuery> {
        let expr = ExprParser::parse(input)?;

        let Expr::Array(array) = &expr else {
            return Err(ParseError::InvalidPipeline("Expected a pipeline array".to_string()).into());
        };

        let stages = Self::stages_from_array(array)?;
        Ok(ParsedQuery::new(None, ParsedCommand::Pipeline(stages)))
    }

    /// A literal with no `db.` prefix: an object is a find filter, an array
    /// is a pipeline. Anything else is not a query.
    fn parse_generic_literal(input: &str) -> Result<ParsedQuery> {
        let expr = ExprParser::parse(input)?;

        match &expr {
            Expr::Array(array) => {
                let stages = Self::stages_from_array(array)?;
                Ok(ParsedQuery::new(None, ParsedCommand::Pipeline(stages)))
            }
            Expr::Object(_) => {
                let filter = match ExpressionConverter::expr_to_bson(&expr)? {
                    Bson::Document(doc) => doc,
                    _ => Document::new(),
                };
                Ok(ParsedQuery::new(
                    None,
                    ParsedCommand::Find(FindSpec {
                        filter,
                        projection: None,
                        limit: None,
                    }),
                ))
            }
            _ => Err(ParseError::InvalidCommand(
                "Query must be a db call, a filter object, or a pipeline array".to_string(),
            )
            .into()),
        }
    }

    fn stages_from_array(array: &ArrayExpr) -> Result<Vec<Document>> {
        array
            .elements
            .iter()
            .map(|element| match ExpressionConverter::expr_to_bson(element)? {
                Bson::Document(doc) => Ok(doc),
                _ => Err(
                    ParseError::InvalidPipeline("Pipeline stages must be objects".to_string())
                        .into(),
                ),
            })
            .collect()
    }
}
