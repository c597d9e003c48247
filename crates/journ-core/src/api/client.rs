//! Typed client for the journal REST API.
//!
//! `JournalApi` validates forms, routes every call through the
//! [`Gateway`], and keeps the session store in step with the login, signup
//! and refresh endpoints.

use tracing::{debug, info};

use crate::auth::{Session, SessionStore};
use crate::models::{
    Acknowledgement, Category, CategoryJournal, Envelope, JournalEntry, SignupOutcome,
    UserDetails,
};
use crate::models::user::SignupResponse;
use crate::validation::{
    is_valid_email, CategoryForm, FieldErrors, JournalForm, JournalUpdate, LoginForm,
    PasswordResetForm, ProfileForm, SignupForm,
};

use super::gateway::Gateway;
use super::navigation::Route;
use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const AUTH_PATH: &str = "api/v1/authentication";
const JOURNAL_PATH: &str = "api/v1/journal";

/// Clone is cheap - it only holds the gateway.
#[derive(Clone)]
pub struct JournalApi {
    gateway: Gateway,
}

impl JournalApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn store(&self) -> &SessionStore {
        self.gateway.store()
    }

    fn user_id(&self) -> Result<String, ApiError> {
        self.store()
            .session()
            .and_then(|s| s.user_id())
            .ok_or(ApiError::NotSignedIn)
    }

    // ===== Authentication =====

    /// Log in and sign the returned payload into the session store
    pub async fn login(&self, form: &LoginForm) -> Result<Session, ApiError> {
        form.validate().map_err(ApiError::Validation)?;

        let session: Session = self
            .gateway
            .post_public(&format!("{}/login", AUTH_PATH), form)
            .await?;

        self.store().sign_in(session.clone()).await;
        self.gateway.navigate(Route::Home);
        Ok(session)
    }

    /// Register a new account. Servers that sign the user in straight away
    /// return the session under `user`; others expect email verification first.
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, ApiError> {
        form.validate().map_err(ApiError::Validation)?;

        let response: SignupResponse = self
            .gateway
            .post_public(&format!("{}/signup", AUTH_PATH), form)
            .await?;

        let signed_in = match response.user {
            Some(user) => {
                self.store().sign_in(Session::new(user)).await;
                self.gateway.navigate(Route::Home);
                true
            }
            None => false,
        };
        debug!(signed_in, "Signup accepted");

        Ok(SignupOutcome {
            message: response.message.unwrap_or_default(),
            signed_in,
        })
    }

    pub async fn logout(&self) {
        self.store().sign_out().await;
    }

    /// Trade the stored refresh token for a fresh session
    pub async fn refresh_session(&self) -> Result<Session, ApiError> {
        let refresh_token = self
            .store()
            .session()
            .and_then(|s| s.refresh_token().map(str::to_string))
            .ok_or(ApiError::NotSignedIn)?;

        let session: Session = self
            .gateway
            .get_with_token(&format!("{}/refresh", AUTH_PATH), &refresh_token)
            .await?;

        self.store().sign_in(session.clone()).await;
        info!("Session refreshed");
        Ok(session)
    }

    /// Ask the server to send a new account verification link
    pub async fn request_activation(&self, email: &str) -> Result<String, ApiError> {
        if !is_valid_email(email.trim()) {
            let mut errors = FieldErrors::new();
            errors.add("email", "Invalid email");
            return Err(ApiError::Validation(errors));
        }
        let body = serde_json::json!({ "email": email.trim() });
        let ack: Acknowledgement = self
            .gateway
            .post_public(&format!("{}/account/activation", AUTH_PATH), &body)
            .await?;
        Ok(ack.message)
    }

    // ===== Account =====

    pub async fn user_details(&self) -> Result<UserDetails, ApiError> {
        let user_id = self.user_id()?;
        self.gateway
            .get(&format!("{}/get_details/{}", AUTH_PATH, user_id))
            .await
    }

    pub async fn update_details(&self, form: &ProfileForm) -> Result<String, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self
            .gateway
            .put(&format!("{}/update_details", AUTH_PATH), form)
            .await?;
        Ok(ack.message)
    }

    pub async fn reset_password(&self, form: &PasswordResetForm) -> Result<String, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self
            .gateway
            .post(&format!("{}/reset_password", AUTH_PATH), form)
            .await?;
        Ok(ack.message)
    }

    // ===== Journal entries =====

    pub async fn journals(&self) -> Result<Vec<JournalEntry>, ApiError> {
        let response: Envelope<Vec<JournalEntry>> = self.gateway.get(JOURNAL_PATH).await?;
        debug!(count = response.message.len(), "Fetched journal entries");
        Ok(response.message)
    }

    pub async fn journal(&self, id: i64) -> Result<JournalEntry, ApiError> {
        let response: Envelope<JournalEntry> = self
            .gateway
            .get(&format!("{}/{}", JOURNAL_PATH, id))
            .await?;
        Ok(response.message)
    }

    pub async fn journals_in_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<CategoryJournal>, ApiError> {
        let response: Envelope<Vec<Envelope<CategoryJournal>>> = self
            .gateway
            .get(&format!("{}/category/{}", JOURNAL_PATH, category_id))
            .await?;
        Ok(response.message.into_iter().map(|e| e.message).collect())
    }

    pub async fn create_journal(&self, form: &JournalForm) -> Result<String, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self.gateway.post(JOURNAL_PATH, form).await?;
        Ok(ack.message)
    }

    pub async fn update_journal(&self, id: i64, update: &JournalUpdate) -> Result<String, ApiError> {
        update.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self
            .gateway
            .put(&format!("{}/{}", JOURNAL_PATH, id), update)
            .await?;
        Ok(ack.message)
    }

    pub async fn delete_journal(&self, id: i64) -> Result<String, ApiError> {
        let ack: Acknowledgement = self
            .gateway
            .delete(&format!("{}/{}", JOURNAL_PATH, id))
            .await?;
        Ok(ack.message)
    }

    // ===== Categories =====

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let response: Envelope<Vec<Category>> = self
            .gateway
            .get(&format!("{}/category", JOURNAL_PATH))
            .await?;
        Ok(response.message)
    }

    pub async fn create_category(&self, form: &CategoryForm) -> Result<String, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self
            .gateway
            .post(&format!("{}/new_category", JOURNAL_PATH), form)
            .await?;
        Ok(ack.message)
    }

    pub async fn rename_category(&self, id: i64, form: &CategoryForm) -> Result<String, ApiError> {
        form.validate().map_err(ApiError::Validation)?;
        let ack: Acknowledgement = self
            .gateway
            .put(&format!("{}/category/{}", JOURNAL_PATH, id), form)
            .await?;
        Ok(ack.message)
    }

    pub async fn delete_category(&self, id: i64) -> Result<String, ApiError> {
        let ack: Acknowledgement = self
            .gateway
            .delete(&format!("{}/category/{}", JOURNAL_PATH, id))
            .await?;
        Ok(ack.message)
    }
}
