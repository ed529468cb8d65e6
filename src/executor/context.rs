//! Execution context management
//!
//! This module provides the ExecutionContext shared by all request handlers.
//! It wraps the single connection established at startup; handlers clone the
//! context freely and never mutate the connection through it.

use std::sync::Arc;
use std::time::Duration;

use mongodb::Database;

use crate::connection::ConnectionManager;
use crate::error::Result;

/// Execution context shared across query executions
#[derive(Clone)]
pub struct ExecutionContext {
    /// Connection manager, fixed after startup
    connection: Arc<ConnectionManager>,
}

impl ExecutionContext {
    /// Create a new execution context
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// Get the configured database handle
    ///
    /// # Returns
    /// * `Result<Database>` - Database handle, or `NotConnected` when startup
    ///   never established a connection
    pub fn get_database(&self) -> Result<Database> {
        self.connection.get_database()
    }

    /// Check whether a connection was established at startup
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Per-query time budget, `None` when disabled
    pub fn query_timeout(&self) -> Option<Duration> {
        self.connection.query_timeout()
    }

    /// Access the underlying connection manager
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }
}
