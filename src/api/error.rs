use std::collections::HashMap;

use thiserror::Error;

/// Field-level validation messages as returned by the backend,
/// keyed by field name (`{"email": ["Enter a valid email address."]}`).
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Prefix of the backend's rejection message for a wrong current password.
/// Matching on it lets callers distinguish "wrong password" from other
/// validation failures on the same endpoint.
const INCORRECT_PASSWORD_MESSAGE: &str = "Please request with correct password";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - access token missing or expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Current password was rejected")]
    IncorrectPassword,

    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Parse a 400 body into field errors, recognizing the backend's
    /// wrong-current-password message.
    fn from_bad_request(body: &str) -> Self {
        if let Ok(fields) = serde_json::from_str::<FieldErrors>(body) {
            let password_rejected = fields
                .get("curr_password")
                .map(|messages| {
                    messages
                        .iter()
                        .any(|m| m.starts_with(INCORRECT_PASSWORD_MESSAGE))
                })
                .unwrap_or(false);
            if password_rejected {
                return ApiError::IncorrectPassword;
            }
            return ApiError::Validation(fields);
        }
        ApiError::InvalidResponse(format!("Status 400: {}", Self::truncate_body(body)))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => Self::from_bad_request(body),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Messages for a single field from a validation error, if any.
    pub fn field_messages(&self, field: &str) -> Option<&[String]> {
        match self {
            ApiError::Validation(fields) => fields.get(field).map(|v| v.as_slice()),
            _ => None,
        }
    }
}
