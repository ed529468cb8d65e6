//! Query execution engine
//!
//! This module provides the execution layer that takes parsed commands and
//! performs the corresponding MongoDB operations. It includes:
//! - Dispatcher for running find and aggregate commands
//! - Execution context wrapping the shared connection
//! - Result types consumed by the HTTP layer

pub mod context;
pub mod dispatch;
pub mod result;

pub use context::ExecutionContext;
pub use dispatch::Dispatcher;
pub use result::{ExecutionStats, QueryOutcome, ResultData};
