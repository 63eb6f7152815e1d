//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and external systems.
//! Each port is a trait that can be implemented by adapters in the
//! infrastructure layer.

mod file_system;
mod http;
mod session_store;

pub use file_system::{FileSystem, FileSystemError};
pub use http::{HttpMethod, HttpTransport, TransportError, TransportRequest, TransportResponse};
pub use session_store::{SessionStore, StoreError};
