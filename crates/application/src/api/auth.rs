//! Login, logout, and session hydration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use kennel_domain::{AdminUser, decode_claims};

use crate::auth::SessionState;
use crate::client::ApiClient;
use crate::config::endpoints;
use crate::error::ClientError;

/// Errors that can occur during login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The credential exchange itself failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The account is valid but its role may not use the admin console.
    #[error("role {role} may not access the admin console")]
    RoleDenied {
        /// The refused role.
        role: String,
    },
}

/// Wire shape of the login request.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Wire shape of the login grant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expiration: Option<String>,
}

/// Authentication operations.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Signs in with email and password.
    ///
    /// The role gate runs before anything is persisted: an account whose
    /// role is blocked never leaves a session behind. On success the
    /// session is stored and the signed-in user returned.
    ///
    /// # Errors
    ///
    /// [`LoginError::RoleDenied`] for blocked roles, otherwise the
    /// underlying [`ClientError`]: rejected credentials surface as an
    /// API error carrying the server's message.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, LoginError> {
        let grant: LoginGrant = self
            .client
            .post_unauthenticated(endpoints::LOGIN, &LoginRequest { email, password })
            .await?;

        let claims = decode_claims(&grant.access_token).map_err(ClientError::from)?;
        let user = AdminUser::from_claims(&claims, &self.client.config().claims);
        if self.client.config().blocked_roles.iter().any(|blocked| *blocked == user.role) {
            warn!(role = %user.role, "login refused for blocked role");
            return Err(LoginError::RoleDenied { role: user.role });
        }

        let user = self
            .client
            .tokens()
            .set_session(&grant.access_token, &grant.refresh_token, grant.expiration)
            .await
            .map_err(LoginError::Client)?;

        info!(user = %user.username, "signed in");
        self.client.events().publish(SessionState::Authenticated);
        Ok(user)
    }

    /// Signs out and clears the persisted session. Signing out while
    /// already signed out succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the persisted session cannot be removed.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.client.tokens().clear().await?;
        self.client.events().publish(SessionState::Anonymous);
        info!("signed out");
        Ok(())
    }

    /// Restores the persisted session after a restart.
    ///
    /// Returns the signed-in user, or `None` when no usable session is
    /// stored (missing, undecodable, or expired).
    ///
    /// # Errors
    ///
    /// Returns an error when the persistence layer fails.
    pub async fn hydrate(&self) -> Result<Option<AdminUser>, ClientError> {
        let user = self.client.tokens().hydrate().await?;
        if user.is_some() {
            self.client.events().publish(SessionState::Authenticated);
        }
        Ok(user)
    }
}
