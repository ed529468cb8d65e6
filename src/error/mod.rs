//! Error handling for the gateway.
//!
//! This module provides:
//! - Structured error information extraction from MongoDB driver errors
//! - Application-specific error kinds with a crate-wide [`Result`] alias
//! - Consistent error text for HTTP error bodies and logging
//!
//! # Example
//!
//! ```rust,no_run
//! use mongate::error::{ParseError, Result};
//!
//! fn reject_empty(input: &str) -> Result<&str> {
//!     if input.trim().is_empty() {
//!         return Err(ParseError::EmptyQuery.into());
//!     }
//!     Ok(input)
//! }
//! ```

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, ExecutionError, GateError, ParseError, Result,
};
pub use mongo::{ErrorInfo, extract_error_info};
