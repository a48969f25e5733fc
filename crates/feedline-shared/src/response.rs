//! The JSON error envelope shared by every REST failure response.

use serde::{Deserialize, Serialize};

/// Error body: HTTP status, a human-readable message and, for validation
/// failures, the per-field messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: 422,
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Not authenticated")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Not authorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal server error")
    }
}
