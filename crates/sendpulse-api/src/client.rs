//! REST client for the SendPulse API
//!
//! The client owns the credentials and the cached bearer token. The token
//! is loaded from the configured store at construction (or acquired if
//! absent) and re-acquired at most once per request when the server
//! replies 401.

use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, RawReply};
use crate::storage::{self, FileTokenStore, RedisTokenStore, StorageKind, TokenStore};
use crate::types::Email;

/// Production API endpoint
pub const API_BASE_URL: &str = "https://api.sendpulse.com";

const TOKEN_PATH: &str = "oauth/access_token";
const SMTP_SEND_PATH: &str = "smtp/emails";

/// Client configuration. `base_url` exists so tests can point the client
/// at a local mock server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API user id
    pub user_id: String,
    /// REST API secret
    pub secret: String,
    /// Provider endpoint, [`API_BASE_URL`] unless overridden
    pub base_url: String,
    /// Token store backend
    pub storage: StorageKind,
    /// Directory for the token file when file storage is selected
    pub token_dir: PathBuf,
    /// Connection string when Redis storage is selected
    pub redis_url: String,
}

impl ClientConfig {
    pub fn new(user_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            secret: secret.into(),
            base_url: API_BASE_URL.to_string(),
            storage: StorageKind::File,
            token_dir: std::env::temp_dir(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.storage = kind;
        self
    }

    pub fn token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }
}

/// Optional request payload for [`SendPulseClient::send_request`]
#[derive(Debug, Clone)]
pub enum Payload {
    /// Key/value pairs, sent as the query string for GET and as a
    /// form-encoded body otherwise
    Form(Vec<(String, String)>),
    /// JSON-encoded body
    Json(Value),
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
}

/// SendPulse REST API client
pub struct SendPulseClient {
    http: reqwest::Client,
    user_id: String,
    secret: String,
    base_url: String,
    token_key: String,
    store: Box<dyn TokenStore>,
    token: RwLock<String>,
}

impl std::fmt::Debug for SendPulseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendPulseClient")
            .field("user_id", &self.user_id)
            .field("base_url", &self.base_url)
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

impl SendPulseClient {
    /// Build a client and make sure it holds a usable token: read the
    /// store first, ask the server only if the store is empty. Fails when
    /// the credentials are empty or no token can be obtained.
    pub async fn new(config: ClientConfig) -> ApiResult<Self> {
        info!("Initializing SendPulse REST API client");
        if config.user_id.is_empty() || config.secret.is_empty() {
            return Err(ApiError::EmptyCredentials);
        }

        let token_key = storage::token_hash_name(&config.user_id, &config.secret);
        let store: Box<dyn TokenStore> = match config.storage {
            StorageKind::File => Box::new(FileTokenStore::new(&config.token_dir)),
            StorageKind::Redis => Box::new(RedisTokenStore::connect(&config.redis_url).await?),
        };

        debug!("Trying to read a cached token from {:?} storage", config.storage);
        let cached = match store.load(&token_key).await {
            Ok(token) => token,
            Err(e) => {
                error!("Failed to read the cached token: {}", e);
                None
            }
        };

        let client = Self {
            http: reqwest::Client::new(),
            user_id: config.user_id,
            secret: config.secret,
            base_url: config.base_url,
            token_key,
            store,
            token: RwLock::new(cached.clone().unwrap_or_default()),
        };

        if cached.is_none() && !client.request_token().await? {
            return Err(ApiError::TokenUnavailable);
        }
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Exchange the credentials for a fresh bearer token. Returns
    /// `Ok(false)` when the server rejects the grant; only transport
    /// failures are errors.
    async fn request_token(&self) -> ApiResult<bool> {
        debug!("Requesting a new access token");
        let grant = [
            ("grant_type", "client_credentials"),
            ("client_id", self.user_id.as_str()),
            ("client_secret", self.secret.as_str()),
        ];
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&grant)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            warn!("Token request rejected with status {}", response.status());
            return Ok(false);
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(format!("token response: {}", e)))?;

        *self.token.write().await = grant.access_token.clone();
        if let Err(e) = self.store.save(&self.token_key, &grant.access_token).await {
            warn!("Failed to persist the access token: {}", e);
        }
        Ok(true)
    }

    /// Issue a request against a relative API path and apply the response
    /// policy: one transparent re-authentication on 401, logged
    /// diagnostics for 404 and 500, and a bare status when the body is
    /// not JSON.
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Payload>,
        use_token: bool,
    ) -> ApiResult<RawReply> {
        let url = self.url(path);
        let mut refreshed = false;
        loop {
            debug!("{} {}", method, url);
            let mut request = self.http.request(method.clone(), &url);
            if use_token {
                request = request.bearer_auth(self.token.read().await.as_str());
            }
            request = match &payload {
                Some(Payload::Form(pairs)) if method == Method::GET => request.query(pairs),
                Some(Payload::Form(pairs)) => request.form(pairs),
                Some(Payload::Json(body)) => request.json(body),
                None => request,
            };

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                refreshed = true;
                // A failed re-authentication still retries with the old
                // token, so a second 401 surfaces through the normal path.
                if !self.request_token().await? {
                    warn!("Re-authentication failed, retrying with the old token");
                }
                continue;
            }

            let body = response.text().await?;
            return Ok(match status.as_u16() {
                404 => {
                    warn!("404: the page you are looking for could not be found");
                    debug!("Raw server response: {}", body);
                    RawReply::Json {
                        status: 404,
                        body: serde_json::from_str(&body).unwrap_or(Value::Null),
                    }
                }
                500 => {
                    error!("The server reported an internal error");
                    RawReply::Json {
                        status: 500,
                        body: serde_json::from_str(&body).unwrap_or(Value::Null),
                    }
                }
                code => match serde_json::from_str(&body) {
                    Ok(parsed) => {
                        debug!("Request response: {}", parsed);
                        RawReply::Json {
                            status: code,
                            body: parsed,
                        }
                    }
                    Err(_) => {
                        error!("Raw server response: {}", body);
                        RawReply::Bare { status: code }
                    }
                },
            });
        }
    }

    /// Send one transactional email.
    ///
    /// The record is validated before any network call (body, then
    /// subject, then sender/recipients); a failing check comes back as
    /// [`ApiResponse::Rejected`]. The HTML part goes out base64-encoded;
    /// the whole record is JSON-serialized into the `email` form field.
    pub async fn smtp_send_mail(&self, email: &Email) -> ApiResult<ApiResponse> {
        info!("Function call: smtp_send_mail");
        if let Some(reply) = email.validate() {
            return Ok(ApiResponse::Rejected(reply));
        }

        let json = serde_json::to_string(&email.encoded())?;
        let reply = self
            .send_request(
                Method::POST,
                SMTP_SEND_PATH,
                Some(Payload::Form(vec![("email".to_string(), json)])),
                true,
            )
            .await?;
        Ok(ApiResponse::from(reply))
    }

    /// The bearer token currently in use
    pub async fn token(&self) -> String {
        self.token.read().await.clone()
    }
}
