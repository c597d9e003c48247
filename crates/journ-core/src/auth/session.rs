use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims bundle returned by the login or signup endpoint.
///
/// The payload is kept exactly as the server sent it. Nothing about its shape
/// is validated; accessors return `None` for fields that are missing or have
/// an unexpected type.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Value);

impl Session {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Bearer token attached to authenticated requests
    pub fn access_token(&self) -> Option<&str> {
        self.0.get("access_token").and_then(Value::as_str)
    }

    /// Token accepted by the refresh endpoint
    pub fn refresh_token(&self) -> Option<&str> {
        self.0.get("refresh_token").and_then(Value::as_str)
    }

    /// User ID as a string. The server sends a number; older payloads used a string.
    pub fn user_id(&self) -> Option<String> {
        match self.0.get("user_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn user_email(&self) -> Option<&str> {
        self.0.get("user_email").and_then(Value::as_str)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }
}

impl From<Value> for Session {
    fn from(payload: Value) -> Self {
        Self(payload)
    }
}

// Tokens must never end up in logs, so Debug only shows who the session belongs to.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id())
            .field("has_access_token", &self.access_token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_read_login_payload() {
        let session = Session::new(json!({
            "message": "Successful Login",
            "access_token": "abc",
            "refresh_token": "def",
            "user_id": 7,
            "user_email": "a@b.co"
        }));
        assert_eq!(session.access_token(), Some("abc"));
        assert_eq!(session.refresh_token(), Some("def"));
        assert_eq!(session.user_id().as_deref(), Some("7"));
        assert_eq!(session.user_email(), Some("a@b.co"));
    }

    #[test]
    fn test_user_id_accepts_string() {
        let session = Session::new(json!({"access_token": "abc", "user_id": "1"}));
        assert_eq!(session.user_id().as_deref(), Some("1"));
    }

    #[test]
    fn test_unexpected_shape_is_kept() {
        let session = Session::new(json!(["not", "an", "object"]));
        assert_eq!(session.access_token(), None);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.payload(), &json!(["not", "an", "object"]));
    }

    #[test]
    fn test_serializes_transparently() {
        let payload = json!({"access_token": "abc", "user_id": "1", "extra": {"k": [1, 2]}});
        let session = Session::new(payload.clone());
        let text = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&text).unwrap();
        assert_eq!(back.into_payload(), payload);
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new(json!({"access_token": "secret-token", "user_id": 3}));
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("has_access_token: true"));
    }
}
