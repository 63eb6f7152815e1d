//! Kennel Domain - Core business types
//!
//! This crate defines the domain model for the Kennel admin client.
//! All types here are pure Rust with no I/O dependencies.

pub mod account;
pub mod auth;
pub mod chat;
pub mod envelope;
pub mod transaction;

pub use account::{Account, AccountQuery, SortOrder};
pub use auth::{AdminUser, ClaimsMapping, DecodeError, Session, TokenClaims, decode_claims};
pub use chat::{
    Conversation, ConversationDetail, ConversationStats, Message, OutgoingMessage, SenderType,
};
pub use envelope::{ApiEnvelope, EnvelopeError, Page, PageEnvelope, unwrap_envelope};
pub use transaction::{Transaction, TransactionStats};
