//! Connection management for MongoDB
//!
//! This module provides connection management functionality including:
//! - Connection establishment at startup
//! - Bounded-ping verification and health checks
//! - Database handle access for query execution
//!
//! One connection is shared for the lifetime of the process. There is no
//! retry or reconnect; when startup fails the manager stays disconnected and
//! every query is refused with `NotConnected`.

use mongodb::bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result};

/// MongoDB connection manager
pub struct ConnectionManager {
    /// MongoDB client instance, `None` until `connect` succeeds
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: ConnectionState,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Connected and ready
    Connected,

    /// Connection attempt failed
    Failed(String),
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `config` - Connection configuration
    ///
    /// # Returns
    /// * `Self` - New connection manager instance, not yet connected
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: ConnectionState::Disconnected,
        }
    }

    /// Establish the connection and verify the server with a bounded ping
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        debug!("Parsing connection URI");
        let mut options = ClientOptions::parse(&self.config.uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri(e.to_string()))?;

        options.app_name = Some("mongate".to_string());
        options.connect_timeout = Some(self.config.connect_timeout());
        options.server_selection_timeout = Some(self.config.connect_timeout());

        let client = Client::with_options(options)
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        // The driver connects lazily; ping so startup reports reachability
        let database = client.database(&self.config.database);
        let ping = tokio::time::timeout(
            self.config.connect_timeout(),
            database.run_command(doc! {"ping": 1}),
        )
        .await;

        match ping {
            Ok(Ok(_)) => {
                info!(
                    "Connected to MongoDB database '{}'",
                    self.config.database
                );
                self.client = Some(client);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                self.state = ConnectionState::Failed(message.clone());
                Err(ConnectionError::PingFailed(message).into())
            }
            Err(_) => {
                self.state = ConnectionState::Failed("ping timed out".to_string());
                Err(ConnectionError::Timeout.into())
            }
        }
    }

    /// Get the configured database handle
    ///
    /// # Returns
    /// * `Result<Database>` - Database handle or `NotConnected`
    pub fn get_database(&self) -> Result<Database> {
        let client = self.client.as_ref().ok_or(ConnectionError::NotConnected)?;
        Ok(client.database(&self.config.database))
    }

    /// Get the MongoDB client
    ///
    /// # Returns
    /// * `Result<&Client>` - Reference to client or `NotConnected`
    pub fn get_client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    /// Get current connection state
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Check if the startup connection was established
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    /// Name of the configured database
    pub fn database_name(&self) -> &str {
        &self.config.database
    }

    /// Per-query time budget, `None` when disabled
    pub fn query_timeout(&self) -> Option<Duration> {
        self.config.query_timeout()
    }

    /// Verify the connection is alive with a bounded ping
    ///
    /// # Returns
    /// * `Result<u64>` - Round-trip time in milliseconds
    pub async fn ping(&self) -> Result<u64> {
        let database = self.get_database()?;
        let started = Instant::now();

        let ping = tokio::time::timeout(
            self.config.connect_timeout(),
            database.run_command(doc! {"ping": 1}),
        )
        .await;

        match ping {
            Ok(Ok(_)) => Ok(started.elapsed().as_millis() as u64),
            Ok(Err(e)) => Err(ConnectionError::PingFailed(e.to_string()).into()),
            Err(_) => Err(ConnectionError::Timeout.into()),
        }
    }
}
