//! Session and token management.
//!
//! This module provides:
//! - A whole-session token store with write-through persistence
//! - Single-flight coordination of token refreshes
//! - Session lifecycle notifications for top-level observers

mod events;
mod refresh;
mod token_store;

pub use events::{SessionEvents, SessionState};
pub use refresh::RefreshCoordinator;
pub use token_store::TokenStore;
