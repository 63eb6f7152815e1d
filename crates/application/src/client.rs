//! The authenticated API client.
//!
//! Every request carries the bearer token and JSON headers and runs
//! under the configured timeout. A 401 triggers one single-flight token
//! refresh followed by exactly one retry; a failed refresh clears the
//! session and surfaces [`ClientError::SessionExpired`]. Success bodies
//! are collapsed through the gateway's `{success, data, message, error}`
//! envelope before they are decoded.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use kennel_domain::{EnvelopeError, unwrap_envelope};

use crate::api::{AccountsApi, AuthApi, ChatApi, TransactionsApi};
use crate::auth::{RefreshCoordinator, SessionEvents, SessionState, TokenStore};
use crate::config::{ClientConfig, endpoints};
use crate::error::{ClientError, ClientResult};
use crate::ports::{HttpMethod, HttpTransport, SessionStore, TransportRequest, TransportResponse};

/// Wire shape of the refresh grant.
///
/// The gateway has emitted both camelCase and snake_case spellings at
/// different times; aliases accept either.
#[derive(Debug, serde::Deserialize)]
struct RefreshGrant {
    #[serde(rename = "accessToken", alias = "access_token")]
    access_token: Option<String>,
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    refresh_token: Option<String>,
}

/// Authenticated JSON client for the admin gateway.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    refresh: RefreshCoordinator,
    events: SessionEvents,
}

impl ApiClient {
    /// Creates a client over the given transport and session store.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let tokens = TokenStore::new(store, config.claims.clone());
        Self {
            config,
            transport,
            tokens,
            refresh: RefreshCoordinator::new(),
            events: SessionEvents::new(),
        }
    }

    /// The token store backing this client.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Subscribes to session state changes. The receiver immediately
    /// sees the current state and later observes forced logouts.
    #[must_use]
    pub fn session_states(&self) -> watch::Receiver<SessionState> {
        self.events.subscribe()
    }

    pub(crate) const fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Authentication operations.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Customer account operations.
    #[must_use]
    pub const fn accounts(&self) -> AccountsApi<'_> {
        AccountsApi::new(self)
    }

    /// Support chat operations.
    #[must_use]
    pub const fn chat(&self) -> ChatApi<'_> {
        ChatApi::new(self)
    }

    /// Transaction operations.
    #[must_use]
    pub const fn transactions(&self) -> TransactionsApi<'_> {
        TransactionsApi::new(self)
    }

    /// Issues an authenticated request, refreshing and retrying once on
    /// a 401.
    ///
    /// The response is returned whatever its status; status handling is
    /// left to the typed helpers. A 401 on the retry is final and comes
    /// back as a plain 401 response.
    ///
    /// # Errors
    ///
    /// Returns transport failures, and the session errors produced when
    /// a refresh becomes necessary and fails.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<String>,
        body: Option<Value>,
    ) -> ClientResult<TransportResponse> {
        let observed = self.refresh.generation();
        let response = self
            .dispatch(method, path, query.as_deref(), body.as_ref(), true)
            .await?;
        if response.status != 401 {
            return Ok(response);
        }

        debug!(path, "request came back 401, refreshing token");
        self.refresh.run(observed, || self.perform_refresh()).await?;
        // One retry with the refreshed token. A second 401 is final.
        self.dispatch(method, path, query.as_deref(), body.as_ref(), true)
            .await
    }

    /// GET returning the envelope-unwrapped, decoded payload.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); additionally fails on non-2xx statuses,
    /// failure envelopes, and payloads that do not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<String>) -> ClientResult<T> {
        let response = self.send(HttpMethod::Get, path, query, None).await?;
        Self::decode(&response)
    }

    /// POST without a body, checking the envelope but discarding the
    /// payload.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn post_ack(&self, path: &str) -> ClientResult<()> {
        let response = self.send(HttpMethod::Post, path, None, None).await?;
        Self::acknowledge(&response)
    }

    /// POST with a JSON body, checking the envelope but discarding the
    /// payload.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn post_with_ack<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        let response = self.send(HttpMethod::Post, path, None, Some(body)).await?;
        Self::acknowledge(&response)
    }

    /// PUT without a body, checking the envelope but discarding the
    /// payload.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn put_ack(&self, path: &str) -> ClientResult<()> {
        let response = self.send(HttpMethod::Put, path, None, None).await?;
        Self::acknowledge(&response)
    }

    /// POST without auth headers and without 401 handling. Credential
    /// exchanges go through here; a 401 from them is a rejection, not a
    /// trigger for a refresh.
    pub(crate) async fn post_unauthenticated<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        let response = self
            .dispatch(HttpMethod::Post, path, None, Some(&body), false)
            .await?;
        if response.status == 401 {
            return Err(ClientError::Api {
                status: Some(401),
                message: Self::failure_message(&response),
            });
        }
        Self::decode(&response)
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&str>,
        body: Option<&Value>,
        attach_auth: bool,
    ) -> ClientResult<TransportResponse> {
        let url = self.endpoint_url(path, query)?;
        let headers = self.headers(attach_auth).await;
        let request = TransportRequest {
            method,
            url,
            headers,
            body: body.map(Value::to_string),
            timeout: self.config.timeout,
        };

        Ok(self.transport.execute(request).await?)
    }

    fn endpoint_url(&self, path: &str, query: Option<&str>) -> ClientResult<Url> {
        let mut url = self
            .config
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    async fn headers(&self, attach_auth: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Content-Type".to_owned(), "application/json".to_owned()),
            ("Accept".to_owned(), "application/json".to_owned()),
        ];
        if let Some(api_key) = &self.config.api_key {
            headers.push(("X-API-Key".to_owned(), api_key.clone()));
        }
        if attach_auth && let Some(session) = self.tokens.session().await {
            headers.push(("Authorization".to_owned(), session.authorization_header()));
        }
        headers
    }

    /// Exchanges the refresh token for a new pair and installs it.
    ///
    /// Every failure path here is unrecoverable: the store is cleared,
    /// the expired state is published, and the caller sees
    /// [`ClientError::SessionExpired`].
    async fn perform_refresh(&self) -> ClientResult<()> {
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            warn!("no refresh token available, forcing logout");
            return Err(self.expire_session().await);
        };

        let body = json!({ "refreshToken": refresh_token });
        let response = match self
            .dispatch(HttpMethod::Post, endpoints::REFRESH, None, Some(&body), false)
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "token refresh request failed, forcing logout");
                return Err(self.expire_session().await);
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "token refresh rejected, forcing logout");
            return Err(self.expire_session().await);
        }

        let grant = match Self::decode::<RefreshGrant>(&response) {
            Ok(grant) => grant,
            Err(error) => {
                warn!(%error, "token refresh response malformed, forcing logout");
                return Err(self.expire_session().await);
            }
        };

        let Some(access_token) = grant.access_token else {
            warn!("token refresh response carried no access token, forcing logout");
            return Err(self.expire_session().await);
        };
        let next_refresh = grant.refresh_token.unwrap_or(refresh_token);

        if let Err(error) = self.tokens.set_session(&access_token, &next_refresh, None).await {
            warn!(%error, "refreshed token could not be installed, forcing logout");
            return Err(self.expire_session().await);
        }

        info!("access token refreshed");
        self.events.publish(SessionState::Authenticated);
        Ok(())
    }

    /// Clears the session and publishes the expired state, returning the
    /// error the caller should surface.
    async fn expire_session(&self) -> ClientError {
        if let Err(error) = self.tokens.clear().await {
            warn!(%error, "session could not be cleared during forced logout");
        }
        self.events.publish(SessionState::Expired);
        ClientError::SessionExpired
    }

    /// Collapses a raw response into the typed payload.
    fn decode<T: DeserializeOwned>(response: &TransportResponse) -> ClientResult<T> {
        let payload = Self::checked_body(response)?;
        serde_json::from_value(payload).map_err(|e| ClientError::InvalidBody(e.to_string()))
    }

    /// Applies status and envelope checks, yielding the payload value.
    fn checked_body(response: &TransportResponse) -> ClientResult<Value> {
        if response.status == 401 {
            return Err(ClientError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ClientError::Api {
                status: Some(response.status),
                message: Self::failure_message(response),
            });
        }
        let value: Value = serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        unwrap_envelope(value).map_err(|error| match error {
            EnvelopeError::Rejected { message } => ClientError::Api {
                status: Some(response.status),
                message,
            },
        })
    }

    /// Like [`checked_body`](Self::checked_body), for endpoints whose
    /// payload is irrelevant. A 2xx with an empty or non-JSON body is
    /// accepted.
    fn acknowledge(response: &TransportResponse) -> ClientResult<()> {
        if response.status == 401 {
            return Err(ClientError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ClientError::Api {
                status: Some(response.status),
                message: Self::failure_message(response),
            });
        }
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(value) => {
                unwrap_envelope(value).map_err(|error| match error {
                    EnvelopeError::Rejected { message } => ClientError::Api {
                        status: Some(response.status),
                        message,
                    },
                })?;
                Ok(())
            }
            // Some mutation endpoints answer 2xx with an empty body.
            Err(_) => Ok(()),
        }
    }

    /// Best failure message a response can offer: the envelope's `error`
    /// or `message` field, the raw body, or the bare status.
    fn failure_message(response: &TransportResponse) -> String {
        let text = response.body_text();
        let from_envelope = serde_json::from_str::<Value>(&text).ok().and_then(|value| {
            ["error", "message"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
        });
        let message = from_envelope.unwrap_or(text);
        if message.trim().is_empty() {
            format!("HTTP {}", response.status)
        } else {
            message
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use kennel_domain::Session;

    use crate::ports::{StoreError, TransportError};

    use super::*;

    fn jwt(subject: &str) -> String {
        let payload = json!({
            "sub": subject,
            "role": "ROLE_ADMIN",
            "username": subject,
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{body}.sig")
    }

    fn json_response(status: u16, body: &Value) -> TransportResponse {
        TransportResponse::new(status, body.to_string().into_bytes())
    }

    #[derive(Default)]
    struct MemoryStore {
        session: Mutex<Option<Session>>,
    }

    impl MemoryStore {
        fn persisted(&self) -> Option<Session> {
            self.session.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionStore for MemoryStore {
        async fn load(&self) -> Result<Option<Session>, StoreError> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn save(&self, session: &Session) -> Result<(), StoreError> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Pops pre-scripted responses in order, recording every request.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport script exhausted")
        }
    }

    /// Simulates the gateway's auth behavior: data routes demand the
    /// currently accepted token, the refresh route issues the configured
    /// grant.
    struct GatewayTransport {
        accepted: Mutex<String>,
        grant: Option<(String, String)>,
        refresh_delay: Duration,
        refresh_calls: AtomicUsize,
        data_calls: AtomicUsize,
    }

    impl GatewayTransport {
        fn new(accepted: &str, grant: Option<(String, String)>) -> Self {
            Self {
                accepted: Mutex::new(accepted.to_owned()),
                grant,
                refresh_delay: Duration::ZERO,
                refresh_calls: AtomicUsize::new(0),
                data_calls: AtomicUsize::new(0),
            }
        }

        fn with_refresh_delay(mut self, delay: Duration) -> Self {
            self.refresh_delay = delay;
            self
        }
    }

    #[async_trait]
    impl HttpTransport for GatewayTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            if request.url.path() == endpoints::REFRESH {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.refresh_delay).await;
                return Ok(match &self.grant {
                    Some((access, refresh)) => {
                        *self.accepted.lock().unwrap() = access.clone();
                        json_response(200, &json!({ "accessToken": access, "refreshToken": refresh }))
                    }
                    None => json_response(401, &json!({ "error": "invalid refresh token" })),
                });
            }

            self.data_calls.fetch_add(1, Ordering::SeqCst);
            let accepted = self.accepted.lock().unwrap().clone();
            let authorized = request
                .headers
                .iter()
                .any(|(name, value)| name == "Authorization" && *value == format!("Bearer {accepted}"));
            Ok(if authorized {
                json_response(200, &json!({ "success": true, "data": { "ready": true } }))
            } else {
                json_response(401, &json!({ "error": "unauthorized" }))
            })
        }
    }

    fn client_over(transport: Arc<dyn HttpTransport>) -> (Arc<MemoryStore>, ApiClient) {
        let store = Arc::new(MemoryStore::default());
        let config = ClientConfig::new(Url::parse("https://gw.test").unwrap()).with_api_key("k-1");
        let client = ApiClient::new(config, transport, Arc::clone(&store) as Arc<dyn SessionStore>);
        (store, client)
    }

    #[tokio::test]
    async fn test_requests_carry_auth_and_json_headers() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            200,
            &json!({ "success": true, "data": {} }),
        ))]));
        let (_, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);
        let token = jwt("admin");
        client.tokens().set_session(&token, "refresh-1", None).await.unwrap();

        let _: Value = client.get("/api/account", Some("page=1".to_owned())).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let headers = &requests[0].headers;
        assert!(headers.contains(&("Content-Type".to_owned(), "application/json".to_owned())));
        assert!(headers.contains(&("Accept".to_owned(), "application/json".to_owned())));
        assert!(headers.contains(&("X-API-Key".to_owned(), "k-1".to_owned())));
        assert!(headers.contains(&("Authorization".to_owned(), format!("Bearer {token}"))));
        assert_eq!(requests[0].url.as_str(), "https://gw.test/api/account?page=1");
    }

    #[tokio::test]
    async fn test_envelope_failure_surfaces_server_message() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            200,
            &json!({ "success": false, "error": "maintenance window" }),
        ))]));
        let (_, client) = client_over(transport);

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(
            result,
            Err(ClientError::Api {
                status: Some(200),
                message: "maintenance window".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_passes_through_untouched() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            500,
            &json!({ "message": "database unavailable" }),
        ))]));
        let (_, client) = client_over(transport);

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(
            result,
            Err(ClientError::Api {
                status: Some(500),
                message: "database unavailable".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::new(
            404,
            b"no such route".to_vec(),
        ))]));
        let (_, client) = client_over(transport);

        let result: ClientResult<Value> = client.get("/api/missing", None).await;

        assert_eq!(
            result,
            Err(ClientError::Api {
                status: Some(404),
                message: "no such route".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_empty_error_body_falls_back_to_status() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::new(
            502,
            Vec::new(),
        ))]));
        let (_, client) = client_over(transport);

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(
            result,
            Err(ClientError::Api {
                status: Some(502),
                message: "HTTP 502".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_timeout_is_reported_without_refreshing() {
        let scripted = Arc::new(ScriptedTransport::new(vec![Err(TransportError::Timeout {
            timeout_ms: 10_000,
        })]));
        let (_, client) = client_over(Arc::clone(&scripted) as Arc<dyn HttpTransport>);

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(result, Err(ClientError::Timeout { timeout_ms: 10_000 }));
        // The one scripted exchange is all that happened; no refresh
        // request followed it.
        let requests = scripted.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/api/account");
    }

    #[tokio::test]
    async fn test_401_refreshes_once_and_retries() {
        let old = jwt("old");
        let new = jwt("new");
        let transport = Arc::new(GatewayTransport::new(&new, Some((new.clone(), "refresh-2".to_owned()))));
        let (store, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);
        client.tokens().set_session(&old, "refresh-1", None).await.unwrap();

        let body: Value = client.get("/api/account", None).await.unwrap();

        assert_eq!(body, json!({ "ready": true }));
        assert_eq!(transport.data_calls.load(Ordering::SeqCst), 2);
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.tokens().access_token().await.as_deref(), Some(new.as_str()));
        assert_eq!(store.persisted().unwrap().refresh_token, "refresh-2");
    }

    #[tokio::test]
    async fn test_second_401_after_refresh_is_final() {
        let old = jwt("old");
        let granted = jwt("granted");
        // The gateway only ever accepts a token nobody is granted.
        let transport = Arc::new(GatewayTransport::new("unreachable", Some((granted, "refresh-2".to_owned()))));
        let (_, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);
        client.tokens().set_session(&old, "refresh-1", None).await.unwrap();

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(result, Err(ClientError::Unauthorized));
        assert_eq!(transport.data_calls.load(Ordering::SeqCst), 2);
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_session_and_notifies() {
        let old = jwt("old");
        let transport = Arc::new(GatewayTransport::new("unreachable", None));
        let (store, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);
        client.tokens().set_session(&old, "refresh-1", None).await.unwrap();
        let mut states = client.session_states();

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(result, Err(ClientError::SessionExpired));
        assert!(store.persisted().is_none());
        assert!(client.tokens().session().await.is_none());
        assert_eq!(*states.borrow_and_update(), SessionState::Expired);
        // No retry happens once the refresh fails.
        assert_eq!(transport.data_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_expires_without_network() {
        let transport = Arc::new(GatewayTransport::new("unreachable", None));
        let (_, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);

        let result: ClientResult<Value> = client.get("/api/account", None).await;

        assert_eq!(result, Err(ClientError::SessionExpired));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.data_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let old = jwt("old");
        let new = jwt("new");
        let transport = Arc::new(
            GatewayTransport::new(&new, Some((new.clone(), "refresh-2".to_owned())))
                .with_refresh_delay(Duration::from_millis(25)),
        );
        let (_, client) = client_over(Arc::clone(&transport) as Arc<dyn HttpTransport>);
        client.tokens().set_session(&old, "refresh-1", None).await.unwrap();
        let client = Arc::new(client);

        let mut tasks = Vec::new();
        for _ in 0..6 {
            let client = Arc::clone(&client);
            tasks.push(tokio::spawn(async move {
                client.get::<Value>("/api/account", None).await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snake_case_refresh_grant_is_accepted() {
        let grant: RefreshGrant =
            serde_json::from_value(json!({ "access_token": "a", "refresh_token": "r" })).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("a"));
        assert_eq!(grant.refresh_token.as_deref(), Some("r"));

        let grant: RefreshGrant =
            serde_json::from_value(json!({ "accessToken": "a", "refreshToken": "r" })).unwrap();
        assert_eq!(grant.access_token.as_deref(), Some("a"));
        assert_eq!(grant.refresh_token.as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn test_ack_accepts_empty_body() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(TransportResponse::new(
            204,
            Vec::new(),
        ))]));
        let (_, client) = client_over(transport);

        client.post_ack("/api/Chat/conversations/c-1/close").await.unwrap();
    }

    #[tokio::test]
    async fn test_ack_rejects_failure_envelope() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            200,
            &json!({ "success": false, "message": "conversation is closed" }),
        ))]));
        let (_, client) = client_over(transport);

        let result = client.put_ack("/api/Chat/messages/m-1/read").await;

        assert_eq!(
            result,
            Err(ClientError::Api {
                status: Some(200),
                message: "conversation is closed".to_owned(),
            })
        );
    }
}
