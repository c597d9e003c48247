//! HTTP layer for the journal server.
//!
//! This module provides the `Gateway`, which attaches the session's bearer
//! token to outbound requests and redirects to login when the server answers
//! 401, and the `JournalApi` built on top of it.

pub mod client;
pub mod error;
pub mod gateway;
pub mod navigation;

pub use client::JournalApi;
pub use error::{ApiError, ServerErrors, GENERIC_ERROR_MESSAGE};
pub use gateway::{Gateway, GatewayOptions, UnauthorizedPolicy, DEFAULT_TIMEOUT_SECS};
pub use navigation::{ChannelNavigator, Navigator, NoopNavigator, Route};
