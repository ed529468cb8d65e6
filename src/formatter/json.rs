//! JSON rendering of execution results
//!
//! This module turns executor results into the JSON values embedded in API
//! responses, with BSON type simplification:
//! - Document lists render as JSON arrays
//! - Single documents render as JSON objects
//! - ObjectId, DateTime, Int64, Decimal128, Binary, etc. are simplified

use mongodb::bson::{Bson, Document};
use serde_json::Value as JsonValue;

use super::bson::{BsonJsonConverter, JsonConverter};
use crate::executor::ResultData;

/// Renders result data for API responses
pub struct JsonFormatter {
    /// Converter for BSON to JSON
    converter: JsonConverter,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self {
            converter: JsonConverter::simplified(),
        }
    }

    /// Render result data as the response `result` value
    ///
    /// # Arguments
    /// * `data` - Result data to render
    ///
    /// # Returns
    /// * `JsonValue` - Array, object, or null
    pub fn render(&self, data: &ResultData) -> JsonValue {
        match data {
            ResultData::Documents(docs) => {
                let json_docs: Vec<JsonValue> =
                    docs.iter().map(|doc| self.render_document(doc)).collect();
                JsonValue::Array(json_docs)
            }
            ResultData::Document(doc) => self.render_document(doc),
            ResultData::None => JsonValue::Null,
        }
    }

    /// Render a single document as a simplified JSON object
    pub fn render_document(&self, doc: &Document) -> JsonValue {
        self.converter.convert_to_json(&Bson::Document(doc.clone()))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{DateTime, doc, oid::ObjectId};

    #[test]
    fn test_render_documents_as_array() {
        let formatter = JsonFormatter::new();
        let data = ResultData::Documents(vec![doc! { "a": 1 }, doc! { "a": 2 }]);

        let result = formatter.render(&data);
        let JsonValue::Array(items) = result else {
            panic!("Expected array");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["a"], JsonValue::Number(1.into()));
    }

    #[test]
    fn test_render_single_document_as_object() {
        let formatter = JsonFormatter::new();
        let data = ResultData::Document(doc! { "name": "test", "value": 42i64 });

        let result = formatter.render(&data);
        assert!(result.is_object());
        assert_eq!(result["value"], JsonValue::Number(42.into()));
    }

    #[test]
    fn test_render_none_as_null() {
        let formatter = JsonFormatter::new();
        assert_eq!(formatter.render(&ResultData::None), JsonValue::Null);
    }

    #[test]
    fn test_render_simplifies_bson_types() {
        let formatter = JsonFormatter::new();
        let oid = ObjectId::parse_str("65705d84dfc3f3b5094e1f72").unwrap();
        let dt = DateTime::from_millis(1701862788373);
        let data = ResultData::Document(doc! {
            "_id": oid,
            "user_id": 1i64,
            "created_time": dt,
            "oauth2": null
        });

        let result = formatter.render(&data);

        // Simplified forms, not extended JSON
        assert_eq!(
            result["_id"],
            JsonValue::String("65705d84dfc3f3b5094e1f72".to_string())
        );
        assert_eq!(result["user_id"], JsonValue::Number(1.into()));
        assert!(
            result["created_time"]
                .as_str()
                .unwrap()
                .starts_with("2023-12-06")
        );
        assert_eq!(result["oauth2"], JsonValue::Null);

        let rendered = result.to_string();
        assert!(!rendered.contains("$oid"));
        assert!(!rendered.contains("$date"));
        assert!(!rendered.contains("$numberLong"));
    }
}
