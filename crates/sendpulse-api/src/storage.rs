//! Pluggable persistence for the cached bearer token
//!
//! The token is shared between the in-process client and an external
//! store so it survives process restarts: either a flat file named by a
//! hash of the credentials, or a Redis entry under the same key with a
//! fixed time-to-live.

use std::path::PathBuf;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Lifetime of a cache-service token entry, in seconds
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Which token store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Flat file on local disk
    File,
    /// Redis entry with a fixed TTL
    Redis,
}

impl StorageKind {
    /// Parse a configured storage name. Unrecognized names fall back to
    /// file storage with a logged warning.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "FILE" => StorageKind::File,
            "REDIS" => StorageKind::Redis,
            other => {
                warn!(
                    "Unknown token storage type '{}', allowed types are FILE and REDIS; using FILE instead",
                    other
                );
                StorageKind::File
            }
        }
    }
}

/// Stable cache key derived from the credentials
pub fn token_hash_name(user_id: &str, secret: &str) -> String {
    let digest = Sha256::digest(format!("{}::{}", user_id, secret).as_bytes());
    hex::encode(digest)
}

/// Read and write the cached token under a credential-derived key
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Return the stored token, or `None` when nothing is cached
    async fn load(&self, key: &str) -> ApiResult<Option<String>>;

    /// Replace the stored token
    async fn save(&self, key: &str, token: &str) -> ApiResult<()>;
}

/// Token store backed by a file named after the key
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, key: &str) -> ApiResult<Option<String>> {
        let path = self.path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let token = content.trim().to_string();
                if token.is_empty() {
                    Ok(None)
                } else {
                    debug!("Read cached token from '{}'", path.display());
                    Ok(Some(token))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No token file at '{}'", path.display());
                Ok(None)
            }
            Err(e) => Err(ApiError::StorageError(format!(
                "cannot read token file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    async fn save(&self, key: &str, token: &str) -> ApiResult<()> {
        let path = self.path(key);
        tokio::fs::write(&path, token).await.map_err(|e| {
            ApiError::StorageError(format!("cannot write token file '{}': {}", path.display(), e))
        })?;
        debug!("Stored token in '{}'", path.display());
        Ok(())
    }
}

/// Token store backed by a Redis entry with [`TOKEN_TTL_SECS`] expiry
pub struct RedisTokenStore {
    manager: ConnectionManager,
}

impl RedisTokenStore {
    /// Connect to Redis. The connection manager reconnects on its own
    /// after transient failures.
    pub async fn connect(url: &str) -> ApiResult<Self> {
        info!("Connecting to Redis at {}", url);
        let client = redis::Client::open(url).map_err(|e| ApiError::StorageError(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| ApiError::StorageError(e.to_string()))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn load(&self, key: &str) -> ApiResult<Option<String>> {
        let mut conn = self.manager.clone();
        let token: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| ApiError::StorageError(e.to_string()))?;
        if token.is_some() {
            debug!("Read cached token from Redis");
        }
        Ok(token)
    }

    async fn save(&self, key: &str, token: &str) -> ApiResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(key, token, TOKEN_TTL_SECS)
            .await
            .map_err(|e| ApiError::StorageError(e.to_string()))?;
        debug!("Stored token in Redis with {}s expiry", TOKEN_TTL_SECS);
        Ok(())
    }
}
