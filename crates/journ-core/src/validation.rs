//! Client-side form validation, run before any request leaves the device.
//!
//! Each form's `validate` returns every problem at once, keyed by field name,
//! so a front end can show messages next to the matching input.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Key used for messages that do not belong to a single field
pub const GENERAL: &str = "general";

const MIN_PASSWORD_LEN: usize = 6;
const MAX_PHONE_LEN: usize = 20;

const PASSWORD_TOO_SHORT: &str = "Password is too short - should be 6 chars minimum.";
const INVALID_EMAIL: &str = "Invalid email";
const PHONE_TOO_LONG: &str = "Phone number must be a string shorter than 20 characters";

/// Messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, keeping the first one if it already has one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.get(GENERAL)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if field == GENERAL {
                f.write_str(message)?;
            } else {
                write!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.add(field, message);
        }
        errors
    }
}

/// Loose structural check: one `@`, something before it, a dotted domain after it.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email.trim()) {
        errors.add("email", INVALID_EMAIL);
    }
}

fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.is_empty() {
        errors.add(field, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, PASSWORD_TOO_SHORT);
    }
}

fn check_phone(errors: &mut FieldErrors, phone: &str) {
    if phone.chars().count() > MAX_PHONE_LEN {
        errors.add("phone_number", PHONE_TOO_LONG);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

/// Registration form. `confirm_password` never leaves the client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if self.phone_number.trim().is_empty() {
            errors.add("phone_number", "Phone number is required");
        } else {
            check_phone(&mut errors, &self.phone_number);
        }
        check_password(&mut errors, "password", &self.password);
        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "Confirm password is required");
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords must match");
        }
        errors.into_result()
    }
}

/// New journal entry. Every field is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalForm {
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
}

impl JournalForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty()
            || self.content.trim().is_empty()
            || self.category_id.is_none()
        {
            errors.add(GENERAL, "Please fill out all fields.");
        }
        errors.into_result()
    }
}

/// Partial edit of an existing entry. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl JournalUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category_id.is_none()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.is_empty() {
            errors.add(GENERAL, "Nothing to update.");
        }
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            errors.add("title", "Title cannot be empty");
        }
        if matches!(self.content.as_deref(), Some(c) if c.trim().is_empty()) {
            errors.add("content", "Content cannot be empty");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Please enter a category name.");
        }
        errors.into_result()
    }
}

/// Settings screen form. Unset fields are left unchanged on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.is_none() && self.username.is_none() && self.phone_number.is_none() {
            errors.add(GENERAL, "Nothing to update.");
        }
        if let Some(ref email) = self.email {
            check_email(&mut errors, email);
        }
        if matches!(self.username.as_deref(), Some(u) if u.trim().is_empty()) {
            errors.add("username", "Username is required");
        }
        if let Some(ref phone) = self.phone_number {
            check_phone(&mut errors, phone);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PasswordResetForm {
    pub old_password: String,
    pub new_password: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.old_password.is_empty() {
            errors.add("old_password", "Password is required");
        }
        check_password(&mut errors, "new_password", &self.new_password);
        errors.into_result()
    }
}
