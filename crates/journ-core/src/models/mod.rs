//! Data models for the journal API.
//!
//! - `JournalEntry`, `CategoryJournal`, `Category`: journal content
//! - `UserDetails`, `SignupOutcome`: account data
//! - `Envelope`, `Acknowledgement`: the server's `{"message": ...}` wrapper

pub mod journal;
pub mod user;

use serde::{Deserialize, Serialize};

pub use journal::{Category, CategoryJournal, JournalEntry};
pub use user::{SignupOutcome, UserDetails};

/// Successful responses wrap their payload in a `message` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: T,
}

/// Response of write endpoints: a human-readable confirmation.
pub type Acknowledgement = Envelope<String>;
