//! Authentication domain types.
//!
//! This module provides:
//! - JWT payload decoding without signature verification
//! - Tolerant claim-to-user mapping with configurable alias lists
//! - The persisted admin session shape

mod claims;
mod session;

pub use claims::{ClaimsMapping, DecodeError, TokenClaims, decode_claims};
pub use session::{AdminUser, Session};
