//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Common error codes used across the application
pub mod error_codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
    pub const SESSION_CLOSED: &str = "SESSION_CLOSED";
    pub const SESSION_STATE_CONFLICT: &str = "SESSION_STATE_CONFLICT";
    pub const CHANNEL_NOT_CONFIGURED: &str = "CHANNEL_NOT_CONFIGURED";
    pub const RESEND_UNAVAILABLE: &str = "RESEND_UNAVAILABLE";
    pub const VERIFICATION_CODE_INVALID: &str = "VERIFICATION_CODE_INVALID";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail_serializes_value() {
        let response = ErrorResponse::new(error_codes::RESEND_UNAVAILABLE, "Resend not available")
            .add_detail("channel", "sms");

        let details = response.details.unwrap();
        assert_eq!(details.get("channel"), Some(&serde_json::json!("sms")));
    }

    #[test]
    fn test_details_skipped_when_absent() {
        let json = serde_json::to_string(&ErrorResponse::new("X", "y")).unwrap();
        assert!(!json.contains("details"));
    }
}
