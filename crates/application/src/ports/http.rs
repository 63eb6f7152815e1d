//! HTTP transport port

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors reported by a transport.
///
/// Anything that comes back with a status line and a body is a response,
/// not an error; the transport only fails when no response exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange exceeded its deadline, before or during the body.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// DNS, connect, TLS, or transfer failure.
    #[error("network error: {0}")]
    Network(String),
}

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
}

impl HttpMethod {
    /// Canonical verb string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// A fully resolved request handed to the transport.
///
/// The client has already attached headers and serialized the body; the
/// transport's only job is the exchange itself.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: Url,
    /// Header name and value pairs, in send order.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body, when the request carries one.
    pub body: Option<String>,
    /// Hard deadline for the whole exchange.
    pub timeout: Duration,
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Port for executing HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes one request and waits for the full body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the exchange fails before a
    /// status and body are available.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
