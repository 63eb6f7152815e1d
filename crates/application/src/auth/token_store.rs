//! Whole-session token storage with write-through persistence.
//!
//! This module provides a thread-safe store for the admin session. The
//! in-memory value is a cache; every mutation persists through the
//! [`SessionStore`] port before it becomes visible, so a session survives
//! process restart.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use kennel_domain::{AdminUser, ClaimsMapping, Session, decode_claims};

use crate::error::ClientResult;
use crate::ports::SessionStore;

/// Thread-safe session store.
///
/// The session is replaced as a whole on every change; the stored user is
/// always the one derived from the current access token, never a stale
/// value carried over from an earlier token.
pub struct TokenStore {
    persist: Arc<dyn SessionStore>,
    mapping: ClaimsMapping,
    session: RwLock<Option<Session>>,
}

impl TokenStore {
    /// Creates an empty store over the given persistence adapter.
    #[must_use]
    pub fn new(persist: Arc<dyn SessionStore>, mapping: ClaimsMapping) -> Self {
        Self {
            persist,
            mapping,
            session: RwLock::new(None),
        }
    }

    /// Loads the persisted session into memory.
    ///
    /// The user is recomputed from the persisted access token rather than
    /// trusted from disk, and the recomputed value is written back. A
    /// session that cannot be read, does not decode, or has already
    /// expired clears the store and hydrates to `None`; startup never
    /// fails over leftover state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`](crate::ClientError::Storage) when
    /// the persistence layer fails while writing back or clearing.
    pub async fn hydrate(&self) -> ClientResult<Option<AdminUser>> {
        let stored = match self.persist.load().await {
            Ok(stored) => stored,
            Err(error) => {
                warn!(%error, "persisted session could not be read, clearing");
                self.clear().await?;
                return Ok(None);
            }
        };
        let Some(stored) = stored else {
            return Ok(None);
        };

        let user = match decode_claims(&stored.access_token) {
            Ok(claims) if !claims.is_expired() => AdminUser::from_claims(&claims, &self.mapping),
            Ok(_) => {
                debug!("persisted session has expired, clearing");
                self.clear().await?;
                return Ok(None);
            }
            Err(error) => {
                warn!(%error, "persisted access token does not decode, clearing");
                self.clear().await?;
                return Ok(None);
            }
        };

        let session = Session::new(
            stored.access_token,
            stored.refresh_token,
            user.clone(),
            stored.expiration,
        );
        self.persist.save(&session).await?;
        *self.session.write().await = Some(session);
        debug!(user = %user.username, "session hydrated");
        Ok(Some(user))
    }

    /// Replaces the session with a new token pair.
    ///
    /// The user is derived from the access token before anything is
    /// stored; a token that does not decode fails the call and leaves the
    /// previous session in place, on disk and in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`](crate::ClientError::Decode) when
    /// the access token does not decode, or
    /// [`ClientError::Storage`](crate::ClientError::Storage) when the
    /// session cannot be persisted.
    pub async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expiration: Option<String>,
    ) -> ClientResult<AdminUser> {
        let claims = decode_claims(access_token)?;
        let user = AdminUser::from_claims(&claims, &self.mapping);
        let session = Session::new(
            access_token.to_owned(),
            refresh_token.to_owned(),
            user.clone(),
            expiration,
        );

        self.persist.save(&session).await?;
        *self.session.write().await = Some(session);
        debug!(user = %user.username, "session replaced");
        Ok(user)
    }

    /// Clears the session from memory and from the persistent store.
    /// Clearing an already empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`](crate::ClientError::Storage) when
    /// the persisted session cannot be removed.
    pub async fn clear(&self) -> ClientResult<()> {
        self.persist.clear().await?;
        *self.session.write().await = None;
        Ok(())
    }

    /// The current access token.
    pub async fn access_token(&self) -> Option<String> {
        let session = self.session.read().await;
        session.as_ref().map(|s| s.access_token.clone())
    }

    /// The current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        let session = self.session.read().await;
        session.as_ref().map(|s| s.refresh_token.clone())
    }

    /// The currently signed-in user.
    pub async fn current_user(&self) -> Option<AdminUser> {
        let session = self.session.read().await;
        session.as_ref().map(|s| s.user.clone())
    }

    /// A snapshot of the whole session.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}
