//! Output formatting for API responses
//!
//! This module provides JSON rendering for query execution results:
//! - BSON type simplification (ObjectId, DateTime, Int64, Decimal128, ...)
//! - Document lists as arrays, single documents as objects

pub mod bson;
pub mod json;

pub use bson::{BsonJsonConverter, JsonConverter};
pub use json::JsonFormatter;
