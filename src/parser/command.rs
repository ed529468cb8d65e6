//! Parsed command types produced by the query parser
//!
//! These are the only shapes the dispatcher will execute. A command is
//! immutable once built; the dispatcher reads it and never writes back.

use bson::Document;
use serde::Deserialize;

use crate::error::{ParseError, Result};

/// A filtered lookup: filter plus optional projection and result limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindSpec {
    /// Match conditions, field path to condition.
    pub filter: Document,

    /// Field inclusion/exclusion flags. `None` means return full documents.
    pub projection: Option<Document>,

    /// Explicit result limit. `None` defers to the endpoint default.
    pub limit: Option<i64>,
}

/// Structured representation of a translated command string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    /// Simple lookup with optional projection and limit.
    Find(FindSpec),

    /// Aggregation pipeline, stages in source order.
    Pipeline(Vec<Document>),
}

/// A parsed command together with the collection name extracted from a
/// `db.<name>.` prefix, when one was present.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub collection: Option<String>,
    pub command: ParsedCommand,
}

impl ParsedQuery {
    pub fn new(collection: Option<String>, command: ParsedCommand) -> Self {
        Self {
            collection,
            command,
        }
    }
}

/// Strict-JSON request envelope accepted by the query endpoint:
/// `{"operation": "find", "filter": {...}, "project": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryEnvelope {
    pub operation: String,

    #[serde(default)]
    pub filter: Option<Document>,

    #[serde(default)]
    pub project: Option<Document>,
}

impl QueryEnvelope {
    /// Convert the envelope into an executable command.
    ///
    /// `findOne` becomes a find with limit 1; its result renders as a single
    /// document. Anything other than `find`/`findOne` is rejected.
    pub fn into_command(self) -> Result<ParsedCommand> {
        let limit = match self.operation.as_str() {
            "find" => None,
            "findOne" => Some(1),
            op => {
                return Err(ParseError::InvalidCommand(format!(
                    "Unsupported envelope operation '{op}': only find and findOne are allowed"
                ))
                .into());
            }
        };

        Ok(ParsedCommand::Find(FindSpec {
            filter: self.filter.unwrap_or_default(),
            projection: self.project,
            limit,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_envelope_find() {
        let envelope: QueryEnvelope = serde_json::from_str(
            r#"{"operation": "find", "filter": {"author": "Melville"}, "project": {"title": 1}}"#,
        )
        .unwrap();

        match envelope.into_command().unwrap() {
            ParsedCommand::Find(spec) => {
                assert_eq!(spec.filter, doc! {"author": "Melville"});
                // Small JSON integers deserialize as Int32
                assert_eq!(spec.projection, Some(doc! {"title": 1}));
                assert_eq!(spec.limit, None);
            }
            _ => panic!("Expected find command"),
        }
    }

    #[test]
    fn test_envelope_find_one_sets_limit() {
        let envelope: QueryEnvelope =
            serde_json::from_str(r#"{"operation": "findOne", "filter": {"year": 1851}}"#).unwrap();

        match envelope.into_command().unwrap() {
            ParsedCommand::Find(spec) => {
                assert_eq!(spec.limit, Some(1));
                assert!(spec.projection.is_none());
            }
            _ => panic!("Expected find command"),
        }
    }

    #[test]
    fn test_envelope_missing_filter_defaults_empty() {
        let envelope: QueryEnvelope = serde_json::from_str(r#"{"operation": "find"}"#).unwrap();

        match envelope.into_command().unwrap() {
            ParsedCommand::Find(spec) => assert!(spec.filter.is_empty()),
            _ => panic!("Expected find command"),
        }
    }

    #[test]
    fn test_envelope_rejects_write_operation() {
        let envelope: QueryEnvelope =
            serde_json::from_str(r#"{"operation": "deleteMany", "filter": {}}"#).unwrap();

        assert!(envelope.into_command().is_err());
    }

    #[test]
    fn test_envelope_requires_operation_field() {
        let result: std::result::Result<QueryEnvelope, _> =
            serde_json::from_str(r#"{"filter": {}}"#);
        assert!(result.is_err());
    }
}
