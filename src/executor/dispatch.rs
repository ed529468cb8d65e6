//! Command dispatch against MongoDB
//!
//! The dispatcher takes a parsed command plus a target collection and runs it
//! through the driver. Connection state is checked before any driver call, so
//! a service that never connected fails fast instead of hanging on server
//! selection. Every driver interaction runs under the configured time budget.

use std::time::Instant;

use futures::stream::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::Document;
use tracing::{debug, info};

use crate::error::{ConnectionError, ExecutionError, Result};
use crate::parser::{FindSpec, ParsedCommand};

use super::context::ExecutionContext;
use super::result::QueryOutcome;

/// Executes parsed commands on the shared connection
pub struct Dispatcher {
    context: ExecutionContext,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Execute a command against a collection.
    ///
    /// `default_limit` caps finds that carry no explicit limit; pipelines are
    /// never capped here.
    pub async fn dispatch(
        &self,
        collection: &str,
        command: ParsedCommand,
        default_limit: Option<i64>,
    ) -> Result<QueryOutcome> {
        if !self.context.is_connected() {
            return Err(ConnectionError::NotConnected.into());
        }

        let started = Instant::now();

        let mut outcome = match command {
            ParsedCommand::Find(spec) => {
                self.execute_find(collection, spec, default_limit).await?
            }
            ParsedCommand::Pipeline(stages) => self.execute_aggregate(collection, stages).await?,
        };

        outcome.stats.execution_time_ms = started.elapsed().as_millis() as u64;
        Ok(outcome)
    }

    /// Execute a find command
    async fn execute_find(
        &self,
        collection: &str,
        spec: FindSpec,
        default_limit: Option<i64>,
    ) -> Result<QueryOutcome> {
        debug!(
            "Executing find on collection '{}' with filter: {:?}",
            collection, spec.filter
        );

        let db = self.context.get_database()?;
        let coll: Collection<Document> = db.collection(collection);

        // Build find options
        let mut find_opts = mongodb::options::FindOptions::default();
        find_opts.projection = spec.projection.filter(|p| !p.is_empty());

        // A limit of exactly 1 came from findOne and renders as a single
        // document rather than a one-element list.
        let single = spec.limit == Some(1);

        if let Some(limit) = spec.limit.or(default_limit) {
            find_opts.limit = Some(limit);
            debug!("Applied limit: {}", limit);
        }

        let documents = self
            .with_budget(async move {
                let mut cursor = coll.find(spec.filter).with_options(find_opts).await?;

                let mut documents = Vec::new();
                while let Some(doc) = cursor
                    .try_next()
                    .await
                    .map_err(|e| ExecutionError::CursorError(e.to_string()))?
                {
                    documents.push(doc);
                }

                Ok(documents)
            })
            .await?;

        info!("Find returned {} documents", documents.len());

        if single {
            return Ok(match documents.into_iter().next() {
                Some(doc) => QueryOutcome::document(doc),
                None => QueryOutcome::empty(),
            });
        }

        Ok(QueryOutcome::documents(documents))
    }

    /// Execute an aggregation pipeline
    async fn execute_aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<QueryOutcome> {
        info!(
            "Executing aggregate on collection '{}' with {} pipeline stages",
            collection,
            pipeline.len()
        );

        let db = self.context.get_database()?;
        let coll: Collection<Document> = db.collection(collection);

        let documents = self
            .with_budget(async move {
                let mut cursor = coll.aggregate(pipeline).await?;

                let mut documents = Vec::new();
                while let Some(doc) = cursor
                    .try_next()
                    .await
                    .map_err(|e| ExecutionError::CursorError(e.to_string()))?
                {
                    documents.push(doc);
                }

                Ok(documents)
            })
            .await?;

        info!("Aggregation returned {} documents", documents.len());

        Ok(QueryOutcome::documents(documents))
    }

    /// Run a driver interaction under the configured time budget.
    async fn with_budget<T, F>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        match self.context.query_timeout() {
            Some(budget) => match tokio::time::timeout(budget, fut).await {
                Ok(result) => result,
                Err(_) => Err(ExecutionError::Timeout(budget.as_secs()).into()),
            },
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ConnectionConfig;
    use crate::connection::ConnectionManager;
    use crate::error::GateError;
    use crate::parser::FindSpec;

    fn disconnected_dispatcher() -> Dispatcher {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        Dispatcher::new(ExecutionContext::new(Arc::new(manager)))
    }

    #[tokio::test]
    async fn test_find_without_connection_short_circuits() {
        let dispatcher = disconnected_dispatcher();

        let command = ParsedCommand::Find(FindSpec::default());
        let err = dispatcher
            .dispatch("movies", command, Some(20))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GateError::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_pipeline_without_connection_short_circuits() {
        let dispatcher = disconnected_dispatcher();

        let command = ParsedCommand::Pipeline(Vec::new());
        let err = dispatcher.dispatch("books", command, None).await.unwrap_err();

        assert!(matches!(
            err,
            GateError::Connection(ConnectionError::NotConnected)
        ));
    }
}
