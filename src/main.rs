//! MongoDB Query Gateway
//!
//! A small HTTP service that hosts two prebuilt single-page apps and
//! translates MongoDB shell-style query strings into driver calls
//! without evaluating any code.
//!
//! # Usage
//!
//! ```bash
//! mongate mongodb://localhost:27017/sample_mflix
//! ```

use std::sync::Arc;

use tracing::warn;

mod cli;
mod config;
mod connection;
mod error;
mod executor;
mod formatter;
mod parser;
mod server;

use cli::CliInterface;
use connection::ConnectionManager;
use error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// This function orchestrates the application startup:
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Connect to MongoDB
/// 4. Serve HTTP until shutdown
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.print_banner();

    let connection = setup_connection(&cli).await;

    server::serve(cli.config(), connection).await
}

/// Connect to MongoDB, tolerating startup failures.
///
/// A gateway with no reachable database still comes up; requests answer
/// with a connection error and the health endpoint reports the state.
async fn setup_connection(cli: &CliInterface) -> Arc<ConnectionManager> {
    let mut manager = ConnectionManager::new(cli.config().connection.clone());

    if let Err(e) = manager.connect().await {
        warn!("Startup connection failed, serving anyway: {}", e);
    }

    Arc::new(manager)
}

/// Initialize logging system based on the effective configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
