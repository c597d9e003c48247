use serde::{Deserialize, Serialize};

/// Account details shown on the settings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub date_created: Option<String>,
}

/// Body of the signup response. A server that signs the user in straight
/// away includes the session payload under `user`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// What a signup attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub message: String,
    /// True when the response carried a session and the user is now signed in
    pub signed_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_details() {
        let json = r#"{"email": "a@b.co", "username": "ann", "phone_number": "0712", "date_created": "Sat, 17 Oct 2026 08:15:00 GMT"}"#;
        let details: UserDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.username, "ann");
        assert_eq!(details.phone_number.as_deref(), Some("0712"));
    }

    #[test]
    fn test_parse_signup_response_without_user() {
        let json = r#"{"message": "Creation of Account was successful,check your email to verify your account"}"#;
        let resp: SignupResponse = serde_json::from_str(json).unwrap();
        assert!(resp.user.is_none());
        assert!(resp.message.unwrap().starts_with("Creation of Account"));
    }
}
