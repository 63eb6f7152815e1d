//! JWT payload decoding and claim mapping.
//!
//! The admin API issues JWTs whose payload carries identity and role
//! claims. The client never verifies signatures (that is the server's
//! job); it only decodes the payload segment to derive the signed-in
//! user and the token expiry. Decoding is fail-closed: anything that
//! does not parse is treated as "no valid session".

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Role claim URI emitted by ASP.NET identity backends.
const MICROSOFT_ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// Errors raised while decoding a token payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The token does not have the three dot-separated JWT segments.
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),

    /// The payload segment is not valid base64url.
    #[error("payload segment is not valid base64url: {0}")]
    Base64(String),

    /// The decoded payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    /// The decoded payload is valid JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Decoded JWT payload: the standard fields plus the raw claim map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// The `sub` claim, if present.
    pub subject: Option<String>,
    /// The `exp` claim as seconds since the Unix epoch, if present.
    pub expires_at: Option<i64>,
    /// The `iat` claim as seconds since the Unix epoch, if present.
    pub issued_at: Option<i64>,
    /// Every claim in the payload, untouched.
    pub claims: Map<String, Value>,
}

impl TokenClaims {
    /// Looks up a string claim by exact name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Looks up the first alias that resolves to a string claim.
    #[must_use]
    pub fn first_of<'a>(&'a self, aliases: &[String]) -> Option<&'a str> {
        aliases.iter().find_map(|name| self.get_str(name))
    }

    /// Returns false only when the claim is present and explicitly `false`.
    ///
    /// Backend account flags (`isActive`, `status`) are optional on older
    /// tokens; an absent flag means enabled.
    #[must_use]
    pub fn enabled(&self, name: &str) -> bool {
        !matches!(self.claims.get(name), Some(Value::Bool(false)))
    }

    /// Whether the token is expired at the given instant.
    ///
    /// Fail closed: a missing `exp` claim counts as expired, and the
    /// boundary is inclusive (a token expiring exactly now is expired).
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|exp| exp <= now.timestamp())
    }

    /// Whether the token is expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decodes the payload segment of a JWT without verifying its signature.
///
/// Accepts both padded and unpadded base64url payloads.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the token does not have three segments,
/// the payload is not base64url, or it does not decode to a JSON object.
pub fn decode_claims(token: &str) -> Result<TokenClaims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::SegmentCount(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
    let Value::Object(claims) = value else {
        return Err(DecodeError::NotAnObject);
    };

    Ok(TokenClaims {
        subject: claims.get("sub").and_then(Value::as_str).map(str::to_owned),
        expires_at: claim_timestamp(&claims, "exp"),
        issued_at: claim_timestamp(&claims, "iat"),
        claims,
    })
}

/// Reads a NumericDate claim. Fractional values are truncated.
#[allow(clippy::cast_possible_truncation)]
fn claim_timestamp(claims: &Map<String, Value>, name: &str) -> Option<i64> {
    let value = claims.get(name)?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

/// Configurable claim aliases used to derive the admin user.
///
/// Backends disagree on claim names: some emit a bare `role`, ASP.NET
/// emits the Microsoft role-claim URI, and identity fields may arrive
/// as `username`, `email`, `fullName` or `name`. Aliases are tried in
/// order; the first string claim wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsMapping {
    /// Aliases for the role claim, in priority order.
    pub role: Vec<String>,
    /// Aliases for the username claim, in priority order.
    pub username: Vec<String>,
    /// Aliases for the email claim, in priority order.
    pub email: Vec<String>,
    /// Aliases for the display-name claim, in priority order.
    pub full_name: Vec<String>,
    /// Role assigned when no role claim resolves.
    pub fallback_role: String,
}

impl Default for ClaimsMapping {
    fn default() -> Self {
        Self {
            role: vec!["role".to_owned(), MICROSOFT_ROLE_CLAIM.to_owned()],
            username: vec!["username".to_owned(), "email".to_owned()],
            email: vec!["email".to_owned()],
            full_name: vec!["fullName".to_owned(), "name".to_owned()],
            fallback_role: "ROLE_USER".to_owned(),
        }
    }
}
