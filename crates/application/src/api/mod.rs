//! Typed endpoint facades.
//!
//! Thin, resource-oriented views over [`ApiClient`](crate::ApiClient):
//! authentication, customer accounts, support chat, and transactions.
//! Each facade borrows the client and adds nothing but paths, query
//! encoding, and payload types.

mod accounts;
mod auth;
mod chat;
mod transactions;

pub use accounts::AccountsApi;
pub use auth::{AuthApi, LoginError};
pub use chat::ChatApi;
pub use transactions::TransactionsApi;
