//! Client error taxonomy

use thiserror::Error;

use kennel_domain::DecodeError;

use crate::ports::{StoreError, TransportError};

/// Errors surfaced by the authenticated client.
///
/// Variants are `Clone` so a single refresh outcome can be shared with
/// every request that waited on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The request never produced a response: DNS, connect, TLS, or a
    /// failure mid-transfer.
    #[error("network error: {0}")]
    Network(String),

    /// A request URL could not be built from the configured origin.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server rejected the credentials and no retry is possible.
    #[error("unauthorized")]
    Unauthorized,

    /// The session could not be refreshed and has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// The server answered with an error status or a failure envelope.
    #[error("API error: {message}")]
    Api {
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        /// Server-supplied failure message, or a generic fallback.
        message: String,
    },

    /// An access token could not be decoded.
    #[error("invalid token: {0}")]
    Decode(#[from] DecodeError),

    /// A request or response body could not be converted to or from JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The session store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            TransportError::Network(message) => Self::Network(message),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(error: StoreError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_timeout_message_carries_duration() {
        let error = ClientError::Timeout { timeout_ms: 10_000 };
        assert_eq!(error.to_string(), "request timed out after 10000 ms");
    }

    #[test]
    fn test_transport_errors_map_onto_client_errors() {
        assert_eq!(
            ClientError::from(TransportError::Timeout { timeout_ms: 500 }),
            ClientError::Timeout { timeout_ms: 500 }
        );
        assert_eq!(
            ClientError::from(TransportError::Network("refused".to_owned())),
            ClientError::Network("refused".to_owned())
        );
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let error = ClientError::Api {
            status: Some(500),
            message: "database unavailable".to_owned(),
        };
        assert_eq!(error.to_string(), "API error: database unavailable");
    }
}
