//! API route handlers
//!
//! Request bodies arrive as JSON, query strings are translated by the
//! parser, and results come back as `{"success": true, "result": ..,
//! "count": ..}`. Failures render as `{"error": .., "details"?: ..}`
//! with a 400 for anything wrong with the request and a 500 for
//! anything that went wrong running it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::error::{extract_error_info, ConnectionError, GateError, ParseError, Result};
use crate::executor::QueryOutcome;
use crate::parser::{ParsedQuery, QueryEnvelope, QueryParser};
use crate::server::AppState;

/// Collection the search endpoint targets when neither the query string
/// nor the request body names one.
const SEARCH_COLLECTION: &str = "movies";

/// Result cap applied to plain finds on the search endpoint. Explicit
/// limits in the query win; pipelines are never capped.
const SEARCH_FIND_LIMIT: i64 = 20;

/// Collection the query endpoint runs against.
const QUERY_COLLECTION: &str = "books";

/* ========================= Request/response bodies ========================= */

/// Body accepted by `POST /api/search/execute`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Shell-style query string, e.g. `db.movies.find({year: 1999})`.
    pub query: Option<String>,

    /// Target collection, overridden by a `db.<name>.` prefix in the query.
    #[serde(default)]
    pub collection: Option<String>,
}

/// Successful execution response.
#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub result: JsonValue,
    pub count: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body returned by `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub connected: bool,
    pub database: String,
}

/* ========================= Error mapping ========================= */

/// Wrapper that renders a [`GateError`] as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GateError);

impl ApiError {
    /// Status code for the wrapped error.
    ///
    /// Bad input (missing fields, unparseable queries) and requests made
    /// while no MongoDB connection exists map to 400. Everything that
    /// failed during execution maps to 500.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GateError::MissingInput(_) | GateError::Parse(_) => StatusCode::BAD_REQUEST,
            GateError::Connection(ConnectionError::NotConnected) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Driver errors get a one-line summary in `details`; their Display
        // form is multi-line JSON meant for terminals.
        let body = match &self.0 {
            GateError::MongoDb(err) => {
                let info = extract_error_info(err);
                ErrorBody {
                    error: "Query execution failed".to_string(),
                    details: Some(info.summary()),
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        if status.is_server_error() {
            error!("Request failed: {}", body.error);
        } else {
            debug!("Rejected request: {}", body.error);
        }

        (status, Json(body)).into_response()
    }
}

/* ========================= Handlers ========================= */

/// `GET /api/health`.
///
/// Always answers 200; `connected` reflects a live bounded ping so a
/// server that lost its database still reports itself as up.
pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let connected = state.connection.ping().await.is_ok();

    Json(HealthBody {
        status: "ok",
        connected,
        database: state.connection.database_name().to_string(),
    })
}

/// `POST /api/search/execute`.
///
/// Translates the query string and runs it against the collection named
/// by the query's `db.` prefix, the request body, or `movies`, in that
/// order. Plain finds are capped at [`SEARCH_FIND_LIMIT`] documents.
pub async fn search_execute(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> std::result::Result<Json<SuccessBody>, ApiError> {
    let Some(query) = body.query.as_deref() else {
        return Err(GateError::MissingInput(
            "Request body is missing the 'query' field".to_string(),
        )
        .into());
    };

    let parsed = QueryParser::parse(query)?;
    let collection = parsed
        .collection
        .or(body.collection)
        .unwrap_or_else(|| SEARCH_COLLECTION.to_string());

    debug!("Search request against collection '{}'", collection);

    let outcome = state
        .dispatcher
        .dispatch(&collection, parsed.command, Some(SEARCH_FIND_LIMIT))
        .await?;

    Ok(Json(success_body(&state, outcome)))
}

/// `POST /api/query/execute`.
///
/// Accepts either `{"query": "<shell string>"}` or the strict-JSON
/// envelope `{"operation": .., "filter": .., "project": ..}`. Queries run
/// uncapped against the `books` collection unless the query string itself
/// names another one.
pub async fn query_execute(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> std::result::Result<Json<SuccessBody>, ApiError> {
    let parsed = parse_query_body(&body)?;
    let collection = parsed
        .collection
        .unwrap_or_else(|| QUERY_COLLECTION.to_string());

    debug!("Query request against collection '{}'", collection);

    let outcome = state
        .dispatcher
        .dispatch(&collection, parsed.command, None)
        .await?;

    Ok(Json(success_body(&state, outcome)))
}

/// Decode the query endpoint's body, which has two accepted shapes.
fn parse_query_body(body: &JsonValue) -> Result<ParsedQuery> {
    if let Some(query) = body.get("query") {
        let Some(text) = query.as_str() else {
            return Err(GateError::MissingInput(
                "The 'query' field must be a string".to_string(),
            ));
        };
        return QueryParser::parse(text);
    }

    if body.get("operation").is_some() {
        let envelope: QueryEnvelope = serde_json::from_value(body.clone())
            .map_err(|e| ParseError::InvalidCommand(format!("invalid envelope: {e}")))?;
        return Ok(ParsedQuery::new(None, envelope.into_command()?));
    }

    Err(GateError::MissingInput(
        "Request body must contain a 'query' string or an 'operation' envelope".to_string(),
    ))
}

fn success_body(state: &AppState, outcome: QueryOutcome) -> SuccessBody {
    SuccessBody {
        success: true,
        result: state.formatter.render(&outcome.data),
        count: outcome.stats.documents_returned,
    }
}
