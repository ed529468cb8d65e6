use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured error information extracted from MongoDB errors.
///
/// This is intended to be serialized to JSON and consumed by other
/// components (e.g. logging, the HTTP error body).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl ErrorInfo {
    /// Convert error info to pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render the error info as a single-line summary.
    ///
    /// Used for the `details` field of HTTP error bodies, where the full
    /// JSON form would be too noisy.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        match (&self.name, self.code) {
            (Some(name), Some(code)) => parts.push(format!("{name} (code {code})")),
            (Some(name), None) => parts.push(name.clone()),
            (None, Some(code)) => parts.push(format!("code {code}")),
            (None, None) => {}
        }

        if let Some(message) = &self.message {
            parts.push(message.clone());
        }

        if parts.is_empty() {
            if let Some(error_type) = &self.error_type {
                parts.push(error_type.clone());
            }
        }

        parts.join(": ")
    }
}

/// Format MongoDB error messages as pretty JSON wrapped in an `error` field.
///
/// Intended to be used by the parent module's `Display` implementation for
/// `GateError::MongoDb`.
pub fn format_mongodb_error(
    f: &mut fmt::Formatter<'_>,
    error: &mongodb::error::Error,
) -> fmt::Result {
    let info = extract_error_info(error);

    let wrapper = serde_json::json!({ "error": info });

    let json_output = serde_json::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?;
    write!(f, "\n{json_output}")
}

/// Extract structured information from a MongoDB error using the driver API.
///
/// This avoids string parsing where possible by using the driver's typed error
/// structures directly. Only the kinds a read-only gateway can produce are
/// handled specially; everything else falls back to the Display form.
pub fn extract_error_info(error: &mongodb::error::Error) -> ErrorInfo {
    use mongodb::error::ErrorKind;

    let mut info = ErrorInfo::default();

    match error.kind.as_ref() {
        ErrorKind::Command(command_error) => {
            info.error_type = Some("mongo.command_error".to_string());
            info.code = Some(command_error.code);
            info.message = Some(command_error.message.clone());
            info.name = get_error_name(command_error.code);
        }
        ErrorKind::Authentication { message, .. } => {
            info.error_type = Some("mongo.authentication_error".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::InvalidArgument { message, .. } => {
            info.error_type = Some("mongo.invalid_argument".to_string());
            info.message = Some(message.clone());
        }
        ErrorKind::ServerSelection { message, .. } => {
            info.error_type = Some("mongo.server_selection_error".to_string());
            info.message = Some(message.clone());
        }
        _ => {
            info.message = Some(error.to_string());
        }
    }

    info
}

/// Get a human-readable error name from a MongoDB error code.
fn get_error_name(code: i32) -> Option<String> {
    let name = match code {
        2 => "BadValue",
        13 => "Unauthorized",
        18 => "AuthenticationFailed",
        26 => "NamespaceNotFound",
        50 => "MaxTimeMSExpired",
        _ => return None,
    };

    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_name_code_and_message() {
        let info = ErrorInfo {
            error_type: Some("mongo.command_error".to_string()),
            code: Some(26),
            name: Some("NamespaceNotFound".to_string()),
            message: Some("ns does not exist".to_string()),
        };
        assert_eq!(
            info.summary(),
            "NamespaceNotFound (code 26): ns does not exist"
        );
    }

    #[test]
    fn test_summary_message_only() {
        let info = ErrorInfo {
            message: Some("server selection timeout".to_string()),
            ..Default::default()
        };
        assert_eq!(info.summary(), "server selection timeout");
    }

    #[test]
    fn test_summary_empty_falls_back_to_type() {
        let info = ErrorInfo {
            error_type: Some("mongo.command_error".to_string()),
            ..Default::default()
        };
        assert_eq!(info.summary(), "mongo.command_error");
    }

    #[test]
    fn test_known_error_names() {
        assert_eq!(get_error_name(26).as_deref(), Some("NamespaceNotFound"));
        assert_eq!(get_error_name(50).as_deref(), Some("MaxTimeMSExpired"));
        assert!(get_error_name(424242).is_none());
    }
}
