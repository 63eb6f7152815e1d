//! The signed-in admin and the persisted session.

use serde::{Deserialize, Serialize};

use super::claims::{ClaimsMapping, TokenClaims};

/// The signed-in administrator, derived from access-token claims.
///
/// This value is never authoritative on its own: it is recomputed from
/// the token whenever the token changes, and it is persisted only so the
/// UI can render before the first decode on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Subject id from the token (empty when the claim is missing).
    #[serde(default)]
    pub id: String,
    /// Login name; falls back to the email claim.
    #[serde(default)]
    pub username: String,
    /// Email address, when the token carries one.
    #[serde(default)]
    pub email: String,
    /// Display name; falls back to the `name` claim.
    #[serde(default)]
    pub full_name: String,
    /// Optional gender claim, carried through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Resolved role, or the configured fallback role.
    pub role: String,
    /// False only when the token explicitly disables the account.
    #[serde(default = "default_flag")]
    pub is_active: bool,
    /// False only when the token explicitly flags the account.
    #[serde(default = "default_flag")]
    pub status: bool,
}

const fn default_flag() -> bool {
    true
}

impl AdminUser {
    /// Derives the admin user from decoded claims using the given alias
    /// mapping. Infallible: missing claims produce empty fields and the
    /// fallback role, so authorization decisions stay explicit.
    #[must_use]
    pub fn from_claims(claims: &TokenClaims, mapping: &ClaimsMapping) -> Self {
        Self {
            id: claims.subject.clone().unwrap_or_default(),
            username: claims.first_of(&mapping.username).unwrap_or("").to_owned(),
            email: claims.first_of(&mapping.email).unwrap_or("").to_owned(),
            full_name: claims.first_of(&mapping.full_name).unwrap_or("").to_owned(),
            gender: claims.get_str("gender").map(str::to_owned),
            role: claims
                .first_of(&mapping.role)
                .unwrap_or(&mapping.fallback_role)
                .to_owned(),
            is_active: claims.enabled("isActive"),
            status: claims.enabled("status"),
        }
    }
}

/// A complete admin session as held in memory and on disk.
///
/// The serde renames pin the persisted keys to the layout the console has
/// always used (`admin_token`, `admin_refresh_token`, `admin_user`,
/// `admin_token_expiration`), so sessions written by earlier builds keep
/// loading. The session is always replaced as a whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential attached to every authenticated request.
    #[serde(rename = "admin_token")]
    pub access_token: String,
    /// Credential used solely to mint a new access token.
    #[serde(rename = "admin_refresh_token")]
    pub refresh_token: String,
    /// User derived from the access token's claims.
    #[serde(rename = "admin_user")]
    pub user: AdminUser,
    /// Expiration string reported by the login endpoint, if any.
    #[serde(
        rename = "admin_token_expiration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<String>,
}

impl Session {
    /// Creates a session from its parts.
    #[must_use]
    pub const fn new(
        access_token: String,
        refresh_token: String,
        user: AdminUser,
        expiration: Option<String>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            user,
            expiration,
        }
    }

    /// Returns the `Authorization` header value for this session.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
