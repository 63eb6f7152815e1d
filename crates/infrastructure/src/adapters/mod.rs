//! Outbound adapters for external services.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
