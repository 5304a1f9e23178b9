//! Authenticated HTTP client for the library API.
//!
//! [`SessionClient`] is the only component that talks to the server. For
//! every request it:
//!
//! 1. reads the access token from the [`CredentialStore`] and attaches it as
//!    `Authorization: Bearer <token>` (no token means an anonymous request);
//! 2. on `401`, exchanges the refresh token at `POST /auth/refresh`, persists
//!    the renewed pair and re-issues the request, at most
//!    `max_auth_retries` times (default once);
//! 3. if the session cannot be renewed, clears the store, publishes
//!    [`SessionEvent::Expired`] and returns [`ClientError::SessionExpired`].
//!
//! # Single-flight refresh
//!
//! Refreshes are serialized through one gate. A request that waited on the
//! gate re-reads the store first: if the access token it failed with has
//! already been replaced, it retries with the new one instead of refreshing
//! again. N requests expiring together cause exactly one refresh call.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use libdesk_client::{ClientConfig, MemoryCredentialStore, SessionClient};
//!
//! let client = SessionClient::new(&ClientConfig::default(), Arc::new(MemoryCredentialStore::new()))?;
//! let creds = client.login(&LoginRequest::new("admin", "admin123")).await?;
//! client.establish_session(&creds)?;
//! let me = client.current_user().await?;
//! ```

use std::sync::Arc;

use libdesk_core::{
    ApiErrorBody, Credentials, LoginRequest, RefreshTokenRequest, RegisterRequest,
    StoredCredentials, UserProfile,
};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{SessionEvent, SessionEvents};
use crate::store::CredentialStore;

/// Decoded response of a successful (or classified) HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; `Null` when empty, a JSON string when not JSON.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.body).map_err(ClientError::decode)
    }

    fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_status(
                self.status,
                ApiErrorBody::from_value(&self.body),
            ))
        }
    }
}

/// A request kept around long enough to be re-issued after a refresh.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    retries: u8,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            retries: 0,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// How many times this request has already been re-issued after a 401.
    pub fn retries(&self) -> u8 {
        self.retries
    }
}

/// Flatten a serializable struct into query pairs, skipping `None` fields.
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(query).map_err(ClientError::decode)?;
    let Value::Object(map) = value else {
        return Err(ClientError::decode("query must serialize to an object"));
    };
    Ok(map
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    events: SessionEvents,
    refresh_gate: Mutex<()>,
    max_auth_retries: u8,
}

impl SessionClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
            events: SessionEvents::new(),
            refresh_gate: Mutex::new(()),
            max_auth_retries: config.max_auth_retries,
        })
    }

    /// Client with default settings pointed at `base_url`.
    pub fn with_base_url(base_url: &str, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        Self::new(&config, store)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stored credentials, without contacting the server.
    pub fn stored_credentials(&self) -> Option<StoredCredentials> {
        self.store.read()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue an authenticated request with refresh-on-401.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse> {
        let mut pending = PendingRequest::new(method, path);
        if let Some(body) = body {
            pending = pending.with_body(body);
        }
        if let Some(headers) = headers {
            pending = pending.with_headers(headers);
        }
        self.execute(pending).await
    }

    /// Run `pending` to completion, renewing the session on 401.
    pub async fn execute(&self, mut pending: PendingRequest) -> Result<ApiResponse> {
        loop {
            let token = self.store.access_token();
            let response = self.send(&pending, token.as_deref()).await?;
            if response.status != 401 {
                return response.into_result();
            }
            if token.is_none() && self.store.read().is_none() {
                // Never logged in: nothing to renew, clear or announce.
                tracing::debug!(path = %pending.path, "unauthorized without a session");
                return Err(ClientError::SessionExpired);
            }
            if pending.retries >= self.max_auth_retries {
                tracing::debug!(
                    method = %pending.method,
                    path = %pending.path,
                    retries = pending.retries,
                    "still unauthorized, giving up"
                );
                return response.into_result();
            }
            pending.retries += 1;
            self.renew_session(token.as_deref()).await?;
        }
    }

    async fn send(&self, pending: &PendingRequest, token: Option<&str>) -> Result<ApiResponse> {
        let mut req = self
            .http
            .request(pending.method.clone(), self.url(&pending.path))
            .headers(pending.headers.clone());
        if !pending.query.is_empty() {
            req = req.query(&pending.query);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &pending.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(ClientError::network)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(ClientError::network)?;
        tracing::debug!(
            method = %pending.method,
            path = %pending.path,
            status,
            authenticated = token.is_some(),
            "api request"
        );
        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }

    /// Make sure the stored access token differs from `failed_token`,
    /// refreshing it if nobody else has.
    async fn renew_session(&self, failed_token: Option<&str>) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;

        let Some(current) = self.store.read() else {
            // A concurrent request already expired the session.
            return Err(ClientError::SessionExpired);
        };
        if Some(current.access_token.as_str()) != failed_token {
            tracing::debug!("access token already renewed, retrying");
            return Ok(());
        }

        let request = RefreshTokenRequest {
            refresh_token: current.refresh_token.clone(),
        };
        match self.refresh_token(&request).await {
            Ok(refreshed) if !refreshed.access_token.is_empty() => {
                let renewed = current.renewed(&refreshed);
                self.store.save(&renewed)?;
                tracing::info!(username = %renewed.username, "access token refreshed");
                self.events.send(SessionEvent::TokenRefreshed {
                    username: renewed.username,
                });
                Ok(())
            }
            Ok(_) => {
                self.expire("refresh response carried no access token");
                Err(ClientError::SessionExpired)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                self.expire(&e.to_string());
                Err(ClientError::SessionExpired)
            }
        }
    }

    fn expire(&self, reason: &str) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear credentials");
        }
        tracing::info!(reason, "session expired");
        self.events.send(SessionEvent::Expired {
            reason: reason.to_string(),
        });
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(PendingRequest::new(Method::GET, path))
            .await?
            .json()
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let pending = PendingRequest::new(Method::GET, path).with_query(query_pairs(query)?);
        self.execute(pending).await?.json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ClientError::decode)?;
        self.execute(PendingRequest::new(Method::POST, path).with_body(body))
            .await?
            .json()
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(PendingRequest::new(Method::POST, path))
            .await?
            .json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ClientError::decode)?;
        self.execute(PendingRequest::new(Method::PUT, path).with_body(body))
            .await?
            .json()
    }

    /// DELETE; any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(PendingRequest::new(Method::DELETE, path))
            .await?;
        Ok(())
    }

    /// POST to an endpoint that takes no bearer token and never refreshes.
    async fn post_unauthenticated<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ClientError::decode)?;
        let pending = PendingRequest::new(Method::POST, path).with_body(body);
        self.send(&pending, None).await?.into_result()?.json()
    }

    /// Exchange user credentials for tokens. Does not persist them.
    pub async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        tracing::debug!(user = %request.username_or_email, "login");
        self.post_unauthenticated("/auth/login", request).await
    }

    /// Create an account and receive tokens for it. Does not persist them.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Credentials> {
        tracing::debug!(user = %request.username, "register");
        self.post_unauthenticated("/auth/register", request).await
    }

    /// Exchange a refresh token for a new access token. Does not persist.
    pub async fn refresh_token(&self, request: &RefreshTokenRequest) -> Result<Credentials> {
        self.post_unauthenticated("/auth/refresh", request).await
    }

    /// `GET /auth/me`
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.get("/auth/me").await
    }

    /// Persist credentials from login or register.
    pub fn establish_session(&self, credentials: &Credentials) -> Result<()> {
        let stored = StoredCredentials::from(credentials);
        self.store.save(&stored)?;
        tracing::info!(username = %stored.username, "session established");
        self.events.send(SessionEvent::LoggedIn {
            username: stored.username,
        });
        Ok(())
    }

    /// Local logout: clears the store. The server is not contacted.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("logged out");
        self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url)
            .field("max_auth_retries", &self.max_auth_retries)
            .field("events", &self.events)
            .finish()
    }
}
