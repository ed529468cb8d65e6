//! Extraction of collection and operation from `db.<collection>.<op>(...)` calls
//!
//! The expression parser gives us a generic AST; this module pattern-matches
//! the member chain, checks the operation against the read-only allow-list,
//! and converts each argument into BSON. No part of the input is evaluated.

use mongodb::bson::{Bson, Document};

use crate::error::{ParseError, Result};
use crate::parser::ast::{Expr, MemberProperty};
use crate::parser::command::{FindSpec, ParsedCommand, ParsedQuery};
use crate::parser::convert::ExpressionConverter;
use crate::parser::grammar::ExprParser;

/// Parses shell-style `db.collection.operation(args)` strings.
pub struct DbCallParser;

impl DbCallParser {
    /// Parse a `db.`-prefixed call and return the collection together with
    /// the command it resolves to.
    pub fn parse(input: &str) -> Result<ParsedQuery> {
        let expr = ExprParser::parse(input)?;

        let Expr::Call(call) = expr else {
            return Err(ParseError::InvalidCommand(
                "Expected a method call, e.g. db.collection.find({})".to_string(),
            )
            .into());
        };

        let (collection, operation) = Self::extract_db_call_target(&call.callee)?;

        let command = match operation.as_str() {
            "find" => Self::parse_find(&call.arguments)?,
            "aggregate" => Self::parse_aggregate(&call.arguments)?,
            _ => {
                return Err(ParseError::InvalidCommand(format!(
                    "Unsupported operation '{operation}': only find and aggregate are allowed"
                ))
                .into());
            }
        };

        Ok(ParsedQuery::new(Some(collection), command))
    }

    /// Walk the callee and pull out `(collection, operation)` from the
    /// `db.collection.operation` member chain. Computed access with a string
    /// key (`db["movies"].find`) is accepted as well.
    fn extract_db_call_target(callee: &Expr) -> Result<(String, String)> {
        let Expr::Member(outer) = callee else {
            return Err(Self::shape_error());
        };

        let operation = Self::member_name(&outer.property).ok_or_else(Self::shape_error)?;

        let Expr::Member(inner) = &*outer.object else {
            return Err(Self::shape_error());
        };

        let collection = Self::member_name(&inner.property).ok_or_else(Self::shape_error)?;

        match &*inner.object {
            Expr::Ident(name) if name == "db" => Ok((collection, operation)),
            _ => Err(Self::shape_error()),
        }
    }

    fn member_name(property: &MemberProperty) -> Option<String> {
        match property {
            MemberProperty::Ident(name) => Some(name.clone()),
            MemberProperty::Computed(Expr::String(name)) => Some(name.clone()),
            MemberProperty::Computed(_) => None,
        }
    }

    fn shape_error() -> crate::error::GateError {
        ParseError::InvalidCommand("Expected db.collection.operation() syntax".to_string()).into()
    }

    /// `find(filter?, projection?)`: argument 0 is the filter (missing means
    /// match-all), argument 1 the projection.
    fn parse_find(arguments: &[Expr]) -> Result<ParsedCommand> {
        let filter = Self::doc_arg(arguments, 0)?;
        let projection = Self::projection_arg(arguments, 1)?;

        Ok(ParsedCommand::Find(FindSpec {
            filter,
            projection,
            limit: None,
        }))
    }

    /// `aggregate(pipeline?)`: argument 0 is an array of stage documents.
    fn parse_aggregate(arguments: &[Expr]) -> Result<ParsedCommand> {
        let stages = Self::doc_array_arg(arguments, 0)?;
        Ok(ParsedCommand::Pipeline(stages))
    }

    fn doc_arg(arguments: &[Expr], index: usize) -> Result<Document> {
        let Some(expr) = arguments.get(index) else {
            return Ok(Document::new());
        };

        match ExpressionConverter::expr_to_bson(expr)? {
            Bson::Document(doc) => Ok(doc),
            _ => Err(ParseError::InvalidQuery(format!("Argument {index} must be an object")).into()),
        }
    }

    fn projection_arg(arguments: &[Expr], index: usize) -> Result<Option<Document>> {
        if arguments.get(index).is_none() {
            return Ok(None);
        }
        Ok(Some(Self::doc_arg(arguments, index)?))
    }

    fn doc_array_arg(arguments: &[Expr], index: usize) -> Result<Vec<Document>> {
        let Some(expr) = arguments.get(index) else {
            return Ok(Vec::new());
        };

        let Bson::Array(items) = ExpressionConverter::expr_to_bson(expr)? else {
            return Err(
                ParseError::InvalidQuery(format!("Argument {index} must be an array")).into(),
            );
        };

        items
            .into_iter()
            .map(|item| match item {
                Bson::Document(doc) => Ok(doc),
                _ => Err(
                    ParseError::InvalidPipeline("Array must contain only documents".to_string())
                        .into(),
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_find_with_filter_and_projection() {
        let parsed = DbCallParser::parse("db.movies.find({year: 1999}, {title: 1})").unwrap();

        assert_eq!(parsed.collection.as_deref(), Some("movies"));
        match parsed.command {
            ParsedCommand::Find(spec) => {
                assert_eq!(spec.filter, doc! {"year": 1999i64});
                assert_eq!(spec.projection, Some(doc! {"title": 1i64}));
                assert_eq!(spec.limit, None);
            }
            _ => panic!("Expected find command"),
        }
    }

    #[test]
    fn test_find_without_arguments_matches_all() {
        let parsed = DbCallParser::parse("db.books.find()").unwrap();

        match parsed.command {
            ParsedCommand::Find(spec) => {
                assert!(spec.filter.is_empty());
                assert!(spec.projection.is_none());
            }
            _ => panic!("Expected find command"),
        }
    }

    #[test]
    fn test_aggregate_preserves_stage_order() {
        let parsed = DbCallParser::parse(
            r#"db.movies.aggregate([{$match: {year: 2000}}, {$limit: 5}])"#,
        )
        .unwrap();

        match parsed.command {
            ParsedCommand::Pipeline(stages) => {
                assert_eq!(stages.len(), 2);
                assert!(stages[0].contains_key("$match"));
                assert!(stages[1].contains_key("$limit"));
            }
            _ => panic!("Expected pipeline command"),
        }
    }

    #[test]
    fn test_computed_collection_access() {
        let parsed = DbCallParser::parse(r#"db["movies"].find({})"#).unwrap();
        assert_eq!(parsed.collection.as_deref(), Some("movies"));
    }

    #[test]
    fn test_rejects_write_operations() {
        let result = DbCallParser::parse("db.movies.deleteMany({})");
        assert!(result.is_err());

        let message = result.unwrap_err().to_string();
        assert!(message.contains("deleteMany"));
    }

    #[test]
    fn test_rejects_insert_operation() {
        assert!(DbCallParser::parse("db.movies.insertOne({title: 'x'})").is_err());
        assert!(DbCallParser::parse("db.movies.drop()").is_err());
    }

    #[test]
    fn test_rejects_bare_member_access() {
        assert!(DbCallParser::parse("db.movies.find").is_err());
    }

    #[test]
    fn test_rejects_missing_db_prefix() {
        assert!(DbCallParser::parse("movies.find({})").is_err());
    }

    #[test]
    fn test_rejects_non_object_filter() {
        let result = DbCallParser::parse("db.movies.find([1, 2])");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_document_pipeline_stage() {
        let result = DbCallParser::parse("db.movies.aggregate([1, 2])");
        assert!(result.is_err());
    }
}
