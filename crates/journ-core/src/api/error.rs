use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::validation::{FieldErrors, GENERAL};

/// Shown when a failure carries nothing more specific
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error details reported by the server in a failed response body.
///
/// The server answers with `{"error": "..."}` or
/// `{"error": {"field": ["message", ...]}}`; the JWT layer uses `{"msg": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerErrors {
    pub general: Option<String>,
    pub fields: FieldErrors,
}

impl ServerErrors {
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            general: Some(message.into()),
            fields: FieldErrors::new(),
        }
    }

    /// Parse a response body. Bodies that are not JSON become the general message.
    pub fn from_body(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            let trimmed = body.trim();
            return if trimmed.is_empty() {
                Self::default()
            } else {
                Self::general(truncate_body(trimmed))
            };
        };

        match value.get("error").or_else(|| value.get("msg")) {
            Some(Value::String(message)) => Self::general(truncate_body(message)),
            Some(Value::Object(map)) => {
                let fields = map
                    .iter()
                    .map(|(field, messages)| (field.clone(), join_messages(messages)))
                    .collect();
                Self {
                    general: None,
                    fields,
                }
            }
            Some(other) => Self::general(truncate_body(&other.to_string())),
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.fields.is_empty()
    }
}

impl fmt::Display for ServerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.general, self.fields.is_empty()) {
            (Some(general), true) => f.write_str(general),
            (Some(general), false) => write!(f, "{}; {}", general, self.fields),
            (None, false) => write!(f, "{}", self.fields),
            (None, true) => f.write_str("no details"),
        }
    }
}

fn join_messages(messages: &Value) -> String {
    match messages {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Unauthorized - token may be expired ({0})")]
    Unauthorized(ServerErrors),

    #[error("Access denied: {0}")]
    AccessDenied(ServerErrors),

    #[error("Resource not found: {0}")]
    NotFound(ServerErrors),

    #[error("Request rejected ({status}): {errors}")]
    Rejected { status: u16, errors: ServerErrors },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ServerErrors),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Session changed while the request was in flight")]
    SessionChanged,
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let errors = ServerErrors::from_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(errors),
            403 => ApiError::AccessDenied(errors),
            404 => ApiError::NotFound(errors),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(errors),
            code => ApiError::Rejected {
                status: code,
                errors,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Messages to show next to form inputs, with a `general` entry for
    /// anything that is not tied to one field.
    pub fn form_errors(&self) -> FieldErrors {
        let server = match self {
            ApiError::Validation(errors) => return errors.clone(),
            ApiError::Unauthorized(errors)
            | ApiError::AccessDenied(errors)
            | ApiError::NotFound(errors)
            | ApiError::ServerError(errors)
            | ApiError::Rejected { errors, .. } => errors,
            _ => {
                let mut errors = FieldErrors::new();
                errors.add(GENERAL, GENERIC_ERROR_MESSAGE);
                return errors;
            }
        };

        let mut errors = server.fields.clone();
        match server.general {
            Some(ref general) => errors.add(GENERAL, general.clone()),
            None if errors.is_empty() => errors.add(GENERAL, GENERIC_ERROR_MESSAGE),
            None => {}
        }
        errors
    }
}
