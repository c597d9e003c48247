use async_trait::async_trait;
use keyring::Entry;

use super::storage::{SessionStorage, StorageError};
use super::Session;

const SERVICE_NAME: &str = "journ";

/// Keychain account that holds the serialized session
const SESSION_ACCOUNT: &str = "session";

/// Session persisted in the OS keychain instead of a plain file.
///
/// Keychain calls block, so they run on tokio's blocking pool.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a different keychain service name, e.g. one per server profile
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    async fn with_entry<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> Result<T, StorageError> + Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || f(&service)).await?
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn read_secret(service: &str) -> Result<Option<String>, StorageError> {
    match Entry::new(service, SESSION_ACCOUNT)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl SessionStorage for KeyringStorage {
    async fn load(&self) -> Result<Option<Session>, StorageError> {
        match self.with_entry(read_secret).await? {
            Some(secret) => Ok(Some(serde_json::from_str(&secret)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let secret = serde_json::to_string(session)?;
        self.with_entry(move |service| {
            Entry::new(service, SESSION_ACCOUNT)?.set_password(&secret)?;
            // A keychain without a real backend accepts writes and forgets them
            match read_secret(service)? {
                Some(stored) if stored == secret => Ok(()),
                _ => Err(StorageError::NotRetained),
            }
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.with_entry(|service| match Entry::new(service, SESSION_ACCOUNT)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }
}
