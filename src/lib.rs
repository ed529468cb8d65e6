//! MongoDB Query Gateway Library
//!
//! This library provides the core functionality for the mongate HTTP gateway.
//! It translates MongoDB shell-style query strings into driver calls without
//! evaluating any code, and serves the results over a small JSON API.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MongoDB connection management
//! - `error`: Error types and handling
//! - `executor`: Query dispatch and execution
//! - `formatter`: BSON to JSON result rendering
//! - `parser`: Query string translation
//! - `server`: HTTP server and API routes
//!
//! # Example
//!
//! ```
//! use mongate::parser::{ParsedCommand, QueryParser};
//!
//! let parsed = QueryParser::parse("db.movies.find({year: 1999})")?;
//! assert_eq!(parsed.collection.as_deref(), Some("movies"));
//! assert!(matches!(parsed.command, ParsedCommand::Find(_)));
//! # Ok::<(), mongate::error::GateError>(())
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod parser;
pub mod server;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use connection::ConnectionManager;
pub use error::{GateError, Result};
pub use executor::{Dispatcher, QueryOutcome};
pub use formatter::JsonFormatter;
pub use parser::{ParsedCommand, ParsedQuery, QueryParser};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
