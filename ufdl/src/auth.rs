//! Token-based authentication with a UFDL server.
//!
//! A [Connection](crate::Connection) authenticates every request through
//! [BearerAuth], which asks [Authentication] for the current [Tokens]. Tokens
//! are loaded lazily from a [TokenStorage] and obtained from the server with
//! the user's credentials when none are stored.

mod middleware;
mod tokens;

pub use middleware::BearerAuth;
pub use tokens::Tokens;

use crate::client::connection::DEFAULT_TIMEOUT;
use crate::errors::AuthError;
use crate::tokenstore::TokenStorage;
use crate::types::{ServerUrl, Username};
use log::{debug, info, warn};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub(crate) const OBTAIN_PATH: &str = "v1/auth/obtain/";
pub(crate) const REFRESH_PATH: &str = "v1/auth/refresh/";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a Username,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct ObtainResponse {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Credentials of a UFDL user and the tokens they were exchanged for.
pub struct Authentication {
    client: reqwest::Client,
    server: ServerUrl,
    username: Username,
    password: String,
    storage: Arc<dyn TokenStorage>,
    /// `None` until the first time tokens are needed.
    tokens: Mutex<Option<Tokens>>,
    timeout: Duration,
}

impl Authentication {
    pub fn new(
        client: reqwest::Client,
        server: ServerUrl,
        username: Username,
        password: String,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        Self {
            client,
            server,
            username,
            password,
            storage,
            tokens: Mutex::new(None),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Timeout of obtain and refresh calls.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Get tokens which can be used right now. On first use, tokens are
    /// loaded from storage, and obtained from the server if none are stored.
    pub async fn tokens(&self) -> Result<Tokens, AuthError> {
        let mut cached = self.tokens.lock().await;
        if let Some(tokens) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(tokens.clone());
        }
        if cached.is_none() {
            let stored = self.load_stored().await;
            if stored.is_valid() {
                debug!("Using stored tokens for \"{}\" on {}", self.username, self.server);
                *cached = Some(stored.clone());
                return Ok(stored);
            }
        }
        self.obtain_locked(&mut cached).await
    }

    /// Exchange the user's credentials for new tokens.
    ///
    /// If the server rejects the credentials, the cached tokens become invalid.
    pub async fn obtain(&self) -> Result<Tokens, AuthError> {
        let mut cached = self.tokens.lock().await;
        self.obtain_locked(&mut cached).await
    }

    /// Get a new access token using the refresh token. Falls back to
    /// [Authentication::obtain] when there is no refresh token.
    pub async fn refresh(&self) -> Result<Tokens, AuthError> {
        let mut cached = self.tokens.lock().await;
        self.refresh_locked(&mut cached).await
    }

    /// Refresh tokens after the server rejected access token `stale`. If
    /// another task has already renewed the tokens, those are returned
    /// without contacting the server.
    pub(crate) async fn refresh_after(&self, stale: &str) -> Result<Tokens, AuthError> {
        let mut cached = self.tokens.lock().await;
        if let Some(tokens) = renewed(&cached, stale) {
            return Ok(tokens);
        }
        self.refresh_locked(&mut cached).await
    }

    /// Like [Authentication::refresh_after], but obtains new tokens.
    pub(crate) async fn obtain_after(&self, stale: &str) -> Result<Tokens, AuthError> {
        let mut cached = self.tokens.lock().await;
        if let Some(tokens) = renewed(&cached, stale) {
            return Ok(tokens);
        }
        self.obtain_locked(&mut cached).await
    }

    async fn obtain_locked(&self, cached: &mut Option<Tokens>) -> Result<Tokens, AuthError> {
        *cached = Some(Tokens::invalid());
        debug!("Obtaining tokens for \"{}\" on {}", self.username, self.server);
        let res = self
            .client
            .post(self.server.join(OBTAIN_PATH))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(&Credentials {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await?;
        let body: ObtainResponse = accepted(res).await?.json().await?;
        let tokens = Tokens::new(body.access, body.refresh);
        info!("Obtained tokens for \"{}\" on {}", self.username, self.server);
        self.persist(&tokens).await;
        *cached = Some(tokens.clone());
        Ok(tokens)
    }

    async fn refresh_locked(&self, cached: &mut Option<Tokens>) -> Result<Tokens, AuthError> {
        let current = match cached.as_ref() {
            Some(tokens) => tokens.clone(),
            None => self.load_stored().await,
        };
        if !current.has_refresh() {
            debug!("No refresh token for \"{}\", obtaining instead", self.username);
            return self.obtain_locked(cached).await;
        }
        debug!("Refreshing access token for \"{}\" on {}", self.username, self.server);
        let res = self
            .client
            .post(self.server.join(REFRESH_PATH))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(&RefreshRequest {
                refresh: current.refresh(),
            })
            .send()
            .await?;
        let body: RefreshResponse = accepted(res).await?.json().await?;
        let tokens = current.with_access(body.access);
        info!("Refreshed access token for \"{}\" on {}", self.username, self.server);
        self.persist(&tokens).await;
        *cached = Some(tokens.clone());
        Ok(tokens)
    }

    /// Token storage may do file I/O, so it runs off the async worker threads.
    async fn load_stored(&self) -> Tokens {
        let storage = Arc::clone(&self.storage);
        let (server, username) = (self.server.clone(), self.username.clone());
        tokio::task::spawn_blocking(move || storage.load(&server, &username))
            .await
            .unwrap_or_else(|e| {
                warn!("Could not load tokens for \"{}\": {}", self.username, e);
                Tokens::invalid()
            })
    }

    async fn persist(&self, tokens: &Tokens) {
        let storage = Arc::clone(&self.storage);
        let (server, username) = (self.server.clone(), self.username.clone());
        let tokens = tokens.clone();
        let stored = tokio::task::spawn_blocking(move || storage.store(&server, &username, &tokens))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));
        if let Err(e) = stored {
            warn!("Could not store tokens for \"{}\": {}", self.username, e);
        }
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

/// Cached tokens, if they differ from the `stale` access token.
fn renewed(cached: &Option<Tokens>, stale: &str) -> Option<Tokens> {
    cached
        .as_ref()
        .filter(|t| t.is_valid() && t.access() != stale)
        .cloned()
}

async fn accepted(res: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        let text = res.text().await.unwrap_or_default();
        warn!("Authentication rejected ({}): {}", status, text);
        Err(AuthError::Rejected { status, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewed() {
        let cached = Some(Tokens::new("a2", "r1"));
        assert_eq!(renewed(&cached, "a1"), Some(Tokens::new("a2", "r1")));
        assert_eq!(renewed(&cached, "a2"), None);
        assert_eq!(renewed(&Some(Tokens::invalid()), "a1"), None);
        assert_eq!(renewed(&None, "a1"), None);
    }
}
