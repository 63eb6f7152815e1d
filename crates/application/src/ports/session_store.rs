//! Session persistence port

use async_trait::async_trait;
use thiserror::Error;

use kennel_domain::Session;

/// Errors that can occur during session persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Port for durable session storage.
///
/// Implementations must survive process restart; the in-memory session in
/// front of this port is a cache, never the source of truth.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the persisted session, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the store exists but cannot be read or
    /// parsed. A missing store is `Ok(None)`, not an error.
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persists the session, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the session cannot be written durably.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Removes the persisted session. Clearing an empty store is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error when an existing session cannot be removed.
    async fn clear(&self) -> Result<(), StoreError>;
}
