//! Kennel Application - Client core and ports
//!
//! Use cases and orchestration for the admin console: the write-through
//! token store, the single-flight refresh coordinator, the authenticated
//! API client with its typed endpoint facades, and the support-chat
//! viewer. External systems are reached only through the ports defined
//! in this crate.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ports;
pub mod viewer;

pub use auth::{RefreshCoordinator, SessionEvents, SessionState, TokenStore};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use viewer::{ChatViewer, ViewerError};
