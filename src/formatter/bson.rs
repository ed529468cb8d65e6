//! BSON to JSON value conversion
//!
//! API responses carry plain JSON, so BSON-specific types are simplified
//! rather than rendered as extended JSON:
//! - ObjectId and DateTime become strings
//! - Int64 and Timestamp become numbers
//! - Binary becomes base64, regexes render as /pattern/flags

use mongodb::bson::{
    Binary, Bson, DateTime, Decimal128, Document, Regex, Timestamp, oid::ObjectId,
};
use serde_json::Value as JsonValue;

/// Trait for JSON conversion
///
/// The provided `convert_to_json` handles the scalar types inline and
/// delegates BSON-specific types to the implementor.
pub trait BsonJsonConverter {
    fn convert_object_id(&self, oid: &ObjectId) -> JsonValue;
    fn convert_datetime(&self, dt: &DateTime) -> JsonValue;
    fn convert_decimal128(&self, d: &Decimal128) -> JsonValue;
    fn convert_array(&self, arr: &[Bson]) -> JsonValue;
    fn convert_document_to_json(&self, doc: &Document) -> JsonValue;
    fn convert_binary(&self, bin: &Binary) -> JsonValue;
    fn convert_regex(&self, regex: &Regex) -> JsonValue;
    fn convert_timestamp(&self, ts: &Timestamp) -> JsonValue;

    /// Convert BSON value to JSON (provided implementation)
    fn convert_to_json(&self, value: &Bson) -> JsonValue {
        match value {
            Bson::String(s) => JsonValue::String(s.clone()),
            Bson::Int32(n) => JsonValue::Number((*n).into()),
            Bson::Int64(n) => JsonValue::Number((*n).into()),
            Bson::Double(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Bson::Boolean(b) => JsonValue::Bool(*b),
            Bson::Null => JsonValue::Null,
            Bson::ObjectId(oid) => self.convert_object_id(oid),
            Bson::DateTime(dt) => self.convert_datetime(dt),
            Bson::Decimal128(d) => self.convert_decimal128(d),
            Bson::Array(arr) => self.convert_array(arr),
            Bson::Document(doc) => self.convert_document_to_json(doc),
            Bson::Binary(bin) => self.convert_binary(bin),
            Bson::RegularExpression(regex) => self.convert_regex(regex),
            Bson::Timestamp(ts) => self.convert_timestamp(ts),
            Bson::Undefined => JsonValue::Null,
            Bson::MinKey => JsonValue::String("MinKey".to_string()),
            Bson::MaxKey => JsonValue::String("MaxKey".to_string()),
            _ => JsonValue::String(format!("{:?}", value)),
        }
    }
}

/// JSON value converter
///
/// Converts BSON values to standard JSON (serde_json::Value)
pub struct JsonConverter {
    /// Whether to simplify BSON types (true) or preserve string forms (false)
    simplify: bool,
}

impl JsonConverter {
    /// Create a new JSON converter
    pub fn new(simplify: bool) -> Self {
        Self { simplify }
    }

    /// Create a simplified JSON converter (default)
    pub fn simplified() -> Self {
        Self::new(true)
    }
}

impl Default for JsonConverter {
    fn default() -> Self {
        Self::simplified()
    }
}

impl BsonJsonConverter for JsonConverter {
    fn convert_object_id(&self, oid: &ObjectId) -> JsonValue {
        JsonValue::String(oid.to_string())
    }

    fn convert_datetime(&self, dt: &DateTime) -> JsonValue {
        JsonValue::String(datetime_to_iso_string(dt))
    }

    fn convert_decimal128(&self, d: &Decimal128) -> JsonValue {
        let s = d.to_string();
        if self.simplify {
            // Try to convert to number
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(s))
        } else {
            JsonValue::String(s)
        }
    }

    fn convert_array(&self, arr: &[Bson]) -> JsonValue {
        let json_arr: Vec<JsonValue> = arr.iter().map(|v| self.convert_to_json(v)).collect();
        JsonValue::Array(json_arr)
    }

    fn convert_document_to_json(&self, doc: &Document) -> JsonValue {
        let mut map = serde_json::Map::new();
        for (key, value) in doc.iter() {
            map.insert(key.clone(), self.convert_to_json(value));
        }
        JsonValue::Object(map)
    }

    fn convert_binary(&self, bin: &Binary) -> JsonValue {
        JsonValue::String(binary_to_base64(bin))
    }

    fn convert_regex(&self, regex: &Regex) -> JsonValue {
        JsonValue::String(format!("/{}/{}", regex.pattern, regex.options))
    }

    fn convert_timestamp(&self, ts: &Timestamp) -> JsonValue {
        let millis = (ts.time as i64) * 1000 + (ts.increment as i64);
        JsonValue::Number(millis.into())
    }
}

/// Convert DateTime to ISO 8601 string
///
/// Falls back to the raw millisecond timestamp for dates outside the
/// representable RFC 3339 range.
pub fn datetime_to_iso_string(dt: &DateTime) -> String {
    dt.try_to_rfc3339_string()
        .unwrap_or_else(|_| format!("{}", dt.timestamp_millis()))
}

/// Convert Binary data to Base64 string
pub fn binary_to_base64(bin: &Binary) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(&bin.bytes)
}
