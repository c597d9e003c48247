//! Core library for journ: session lifecycle, authenticated HTTP gateway,
//! and the typed journal API.
//!
//! The session store is the single owner of the user's credentials. It is
//! handed to the gateway explicitly, so tests and front ends can swap the
//! storage backend and observe navigation without any global state.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod summary;
pub mod utils;
pub mod validation;

pub use api::{ApiError, Gateway, GatewayOptions, JournalApi, Route, UnauthorizedPolicy};
pub use auth::{AuthState, Session, SessionStore};
pub use config::Config;
