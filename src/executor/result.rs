//! Execution result types
//!
//! This module defines the data structures for representing query execution
//! results:
//! - QueryOutcome: Overall result of a successful execution
//! - ResultData: The shape of the returned data
//! - ExecutionStats: Statistics about the execution

use mongodb::bson::Document;

/// Result of a successful query execution.
///
/// Failures travel through `Result`; an outcome always describes data that
/// came back from the server.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Result data
    pub data: ResultData,

    /// Execution statistics
    pub stats: ExecutionStats,
}

/// Data returned from query execution
#[derive(Debug, Clone)]
pub enum ResultData {
    /// List of documents
    Documents(Vec<Document>),

    /// Single document
    Document(Document),

    /// No data
    None,
}

/// Execution statistics
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Number of documents returned
    pub documents_returned: usize,
}

impl ResultData {
    /// Number of documents this result carries.
    pub fn count(&self) -> usize {
        match self {
            ResultData::Documents(docs) => docs.len(),
            ResultData::Document(_) => 1,
            ResultData::None => 0,
        }
    }
}

impl QueryOutcome {
    /// Create an outcome carrying a list of documents
    pub fn documents(docs: Vec<Document>) -> Self {
        let count = docs.len();
        Self {
            data: ResultData::Documents(docs),
            stats: ExecutionStats {
                execution_time_ms: 0,
                documents_returned: count,
            },
        }
    }

    /// Create an outcome carrying a single document
    pub fn document(doc: Document) -> Self {
        Self {
            data: ResultData::Document(doc),
            stats: ExecutionStats {
                execution_time_ms: 0,
                documents_returned: 1,
            },
        }
    }

    /// Create an outcome carrying no data
    pub fn empty() -> Self {
        Self {
            data: ResultData::None,
            stats: ExecutionStats::default(),
        }
    }
}
