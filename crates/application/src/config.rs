//! Client configuration and the gateway endpoint map.

use std::time::Duration;

use url::Url;

use kennel_domain::ClaimsMapping;

/// Hard per-request timeout applied when none is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between chat poll ticks when none is configured.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Role refused at the admin console by default.
const DEFAULT_BLOCKED_ROLE: &str = "ROLE_USER";

/// Configuration for the admin API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway origin every endpoint path is resolved against.
    pub base_url: Url,
    /// Hard deadline for each request attempt. The retry after a
    /// refresh gets the same deadline again.
    pub timeout: Duration,
    /// Optional `X-API-Key` header value attached to every request.
    pub api_key: Option<String>,
    /// Interval between background chat poll ticks.
    pub poll_interval: Duration,
    /// Claim aliases used to derive the signed-in user from a token.
    pub claims: ClaimsMapping,
    /// Roles refused at login.
    pub blocked_roles: Vec<String>,
}

impl ClientConfig {
    /// Creates a configuration with defaults for everything but the
    /// gateway origin.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            claims: ClaimsMapping::default(),
            blocked_roles: vec![DEFAULT_BLOCKED_ROLE.to_owned()],
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches an `X-API-Key` header to every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the chat poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the claim alias mapping.
    #[must_use]
    pub fn with_claims(mut self, claims: ClaimsMapping) -> Self {
        self.claims = claims;
        self
    }

    /// Replaces the set of roles refused at login.
    #[must_use]
    pub fn with_blocked_roles(mut self, roles: Vec<String>) -> Self {
        self.blocked_roles = roles;
        self
    }
}

/// Gateway endpoint paths.
///
/// The mixed casing (`auth` vs `Chat` vs `Vnpay`) is the gateway's own;
/// paths here must match it byte for byte.
pub mod endpoints {
    /// Exchanges credentials for a token pair.
    pub const LOGIN: &str = "/api/auth/login";

    /// Exchanges a refresh token for a new token pair.
    pub const REFRESH: &str = "/api/auth/refresh-token";

    /// Paginated customer account listing.
    pub const ACCOUNTS: &str = "/api/account";

    /// Every support conversation.
    pub const CONVERSATIONS: &str = "/api/Chat/conversations/all";

    /// Messages in a conversation after a cursor.
    pub const MESSAGES: &str = "/api/Chat/messages";

    /// Sends a staff message.
    pub const SEND_MESSAGE: &str = "/api/Chat/send";

    /// Every VNPay transaction.
    pub const TRANSACTIONS: &str = "/api/Vnpay/transactions/all";

    /// Detail for one conversation, message history included.
    #[must_use]
    pub fn conversation(id: &str) -> String {
        format!("/api/Chat/conversations/{id}")
    }

    /// Marks one message read.
    #[must_use]
    pub fn mark_read(message_id: &str) -> String {
        format!("/api/Chat/messages/{message_id}/read")
    }

    /// Reactivates a conversation.
    #[must_use]
    pub fn activate(id: &str) -> String {
        format!("/api/Chat/conversations/{id}/activate")
    }

    /// Closes a conversation.
    #[must_use]
    pub fn close(id: &str) -> String {
        format!("/api/Chat/conversations/{id}/close")
    }
}
