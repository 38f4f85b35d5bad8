//! Connection settings, from a deserialized document or the environment.

use crate::client::connection::{ConnectionBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use crate::errors::ConfigError;
use crate::tokenstore::{MemoryTokenStorage, TokenStorage};
use crate::types::{ServerUrl, Username};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Where tokens are kept between sessions.
#[derive(Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// [crate::tokenstore::FileTokenStorage] at its default location.
    #[default]
    File,
    Memory,
}

impl FromStr for TokenStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::TokenStore(s.to_string())),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ClientConfig {
    pub url: ServerUrl,
    pub username: Username,
    pub password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token_store: TokenStoreKind,
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("token_store", &self.token_store)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(url: ServerUrl, username: Username, password: impl Into<String>) -> Self {
        Self {
            url,
            username,
            password: password.into(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            token_store: TokenStoreKind::default(),
        }
    }

    /// Read `UFDL_URL`, `UFDL_USERNAME` and `UFDL_PASSWORD`, and optionally
    /// `UFDL_CONNECT_TIMEOUT`, `UFDL_TIMEOUT` (seconds) and `UFDL_TOKEN_STORE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &'static str| lookup(var).filter(|v| !v.is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));
        let seconds = |var: &'static str, default: u64| match get(var) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::NotSeconds { var, value }),
        };
        Ok(Self {
            url: ServerUrl::new(require("UFDL_URL")?)?,
            username: Username::new(require("UFDL_USERNAME")?),
            password: require("UFDL_PASSWORD")?,
            connect_timeout_secs: seconds("UFDL_CONNECT_TIMEOUT", default_connect_timeout())?,
            timeout_secs: seconds("UFDL_TIMEOUT", default_timeout())?,
            token_store: get("UFDL_TOKEN_STORE")
                .map(|s| s.parse::<TokenStoreKind>())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Create a [ConnectionBuilder] with these settings.
    pub fn into_builder(self) -> ConnectionBuilder {
        let builder = ConnectionBuilder::new(self.url, self.username, self.password)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeout_secs));
        match self.token_store {
            TokenStoreKind::File => builder,
            TokenStoreKind::Memory => {
                let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
                builder.token_storage(storage)
            }
        }
    }
}
