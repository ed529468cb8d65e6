use std::{fmt, io};

use crate::error::mongo::format_mongodb_error;

/// Crate-wide `Result` type using [`GateError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, GateError>;

/// Top-level error type for the gateway.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum GateError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Query-string parsing errors.
    Parse(ParseError),

    /// Query execution errors.
    Execution(ExecutionError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Request body lacks a required input.
    MissingInput(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Connection attempt timed out.
    Timeout,

    /// Invalid connection URI.
    InvalidUri(String),

    /// Not currently connected to MongoDB.
    NotConnected,

    /// Ping command failed.
    PingFailed(String),
}

/// Parsing-specific errors.
#[derive(Debug)]
pub enum ParseError {
    /// Empty query string.
    EmptyQuery,

    /// Syntax error in the command string.
    SyntaxError(String),

    /// Invalid command format.
    InvalidCommand(String),

    /// Unexpected token while parsing.
    UnexpectedToken { expected: String, found: String },

    /// Invalid query literal.
    InvalidQuery(String),

    /// Invalid aggregation pipeline.
    InvalidPipeline(String),
}

/// Execution-specific errors.
#[derive(Debug)]
pub enum ExecutionError {
    /// Query execution failed.
    QueryFailed(String),

    /// Cursor iteration failed.
    CursorError(String),

    /// Query exceeded the configured time budget, in seconds.
    Timeout(u64),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Connection(e) => write!(f, "Connection error: {e}"),
            GateError::Parse(e) => write!(f, "{e}"),
            GateError::Execution(e) => write!(f, "Execution error: {e}"),
            GateError::Config(e) => write!(f, "Configuration error: {e}"),
            GateError::Io(e) => write!(f, "I/O error: {e}"),
            GateError::MongoDb(e) => format_mongodb_error(f, e),
            GateError::MissingInput(msg) => write!(f, "{msg}"),
            GateError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::Timeout => write!(f, "Connection timeout"),
            ConnectionError::InvalidUri(uri) => write!(f, "Invalid connection URI: {uri}"),
            ConnectionError::NotConnected => write!(f, "Not connected to MongoDB"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyQuery => write!(f, "empty query"),
            ParseError::SyntaxError(msg) => write!(f, "Syntax error: {msg}"),
            ParseError::InvalidCommand(cmd) => write!(f, "Invalid command: {cmd}"),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "Expected '{expected}', found '{found}'")
            }
            ParseError::InvalidQuery(msg) => write!(f, "Invalid query: {msg}"),
            ParseError::InvalidPipeline(msg) => write!(f, "Invalid pipeline: {msg}"),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            ExecutionError::CursorError(msg) => write!(f, "Cursor error: {msg}"),
            ExecutionError::Timeout(secs) => {
                write!(f, "Query timed out after {secs}s")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for GateError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ParseError {}
impl std::error::Error for ExecutionError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to GateError ========================= */

impl From<io::Error> for GateError {
    fn from(err: io::Error) -> Self {
        GateError::Io(err)
    }
}

impl From<mongodb::error::Error> for GateError {
    fn from(err: mongodb::error::Error) -> Self {
        GateError::MongoDb(err)
    }
}

impl From<ConnectionError> for GateError {
    fn from(err: ConnectionError) -> Self {
        GateError::Connection(err)
    }
}

impl From<ParseError> for GateError {
    fn from(err: ParseError) -> Self {
        GateError::Parse(err)
    }
}

impl From<ExecutionError> for GateError {
    fn from(err: ExecutionError) -> Self {
        GateError::Execution(err)
    }
}

impl From<ConfigError> for GateError {
    fn from(err: ConfigError) -> Self {
        GateError::Config(err)
    }
}

impl From<String> for GateError {
    fn from(msg: String) -> Self {
        GateError::Generic(msg)
    }
}

impl From<&str> for GateError {
    fn from(msg: &str) -> Self {
        GateError::Generic(msg.to_owned())
    }
}
