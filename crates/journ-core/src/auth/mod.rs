//! Session lifecycle: the claims bundle, where it is persisted, and the
//! store that owns it.
//!
//! This module provides:
//! - `Session`: opaque login payload, stored exactly as the server sent it
//! - `SessionStore`: shared handle with `restore`, `sign_in` and `sign_out`
//! - `SessionStorage`: persistence seam with file, keychain and in-memory backends

pub mod credentials;
pub mod session;
pub mod storage;
pub mod store;

pub use credentials::KeyringStorage;
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{AuthState, SessionSnapshot, SessionStore};
