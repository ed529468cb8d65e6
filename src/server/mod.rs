//! HTTP server wiring
//!
//! Hosts the two single-page apps and the JSON API. The search UI is
//! served from the site root and the query UI from `/query`; unknown
//! paths fall back to the search UI's `index.html` so both apps can use
//! client-side routing. API routes live under `/api`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{HttpConfig, ServiceConfig};
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::executor::{Dispatcher, ExecutionContext};
use crate::formatter::JsonFormatter;

pub mod routes;

pub use routes::{ApiError, ErrorBody, HealthBody, SearchRequest, SuccessBody};

/// Shared state handed to every request handler.
pub type AppState = Arc<ServerState>;

/// Everything a handler needs: the dispatcher, the result formatter,
/// and the connection manager for health checks.
pub struct ServerState {
    dispatcher: Dispatcher,
    formatter: JsonFormatter,
    connection: Arc<ConnectionManager>,
    search_assets: PathBuf,
    query_assets: PathBuf,
}

impl ServerState {
    pub fn new(connection: Arc<ConnectionManager>, http: &HttpConfig) -> Self {
        let context = ExecutionContext::new(connection.clone());

        Self {
            dispatcher: Dispatcher::new(context),
            formatter: JsonFormatter::new(),
            connection,
            search_assets: http.search_assets.clone(),
            query_assets: http.query_assets.clone(),
        }
    }
}

/// Assemble the application router.
pub fn build_router(state: AppState) -> Router {
    // Both UIs are built bundles served as static files. CORS stays
    // permissive so the UIs can also be run from a dev server.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Paths with no matching file serve the UI's index.html, so client-side
    // routes survive a full page load.
    let query_ui = ServeDir::new(&state.query_assets)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(state.query_assets.join("index.html")));
    let search_ui = ServeDir::new(&state.search_assets)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(state.search_assets.join("index.html")));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/search/execute", post(routes::search_execute))
        .route("/api/query/execute", post(routes::query_execute))
        .nest_service("/query", query_ui)
        .fallback_service(search_ui)
        .layer(cors)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and run the server until shutdown.
pub async fn serve(config: &ServiceConfig, connection: Arc<ConnectionManager>) -> Result<()> {
    let state = Arc::new(ServerState::new(connection, &config.http));
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping server"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
