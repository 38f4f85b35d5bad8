//! Persistence of [Tokens] between sessions.
//!
//! Tokens are stored per server and per user. The server URL is normalized
//! with [ServerUrl::key], so `http://host/` and `http://host` share tokens.

mod file;
mod memory;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;

use crate::auth::Tokens;
use crate::errors::TokenStoreError;
use crate::types::{ServerUrl, Username};
use camino::Utf8PathBuf;

/// A place where [Tokens] outlive a [crate::Connection].
pub trait TokenStorage: Send + Sync + std::fmt::Debug {
    /// Get the tokens of `username` on `server`. Returns invalid tokens if
    /// none were stored.
    fn load(&self, server: &ServerUrl, username: &Username) -> Tokens;

    /// Save the tokens of `username` on `server`, replacing previous ones.
    /// Invalid tokens are refused.
    fn store(
        &self,
        server: &ServerUrl,
        username: &Username,
        tokens: &Tokens,
    ) -> Result<(), TokenStoreError>;

    /// Forget the tokens of `username` on `server`. Returns `true` if any were stored.
    fn remove(&self, server: &ServerUrl, username: &Username) -> Result<bool, TokenStoreError>;
}

pub(crate) fn ensure_storable(
    server: &ServerUrl,
    username: &Username,
    tokens: &Tokens,
) -> Result<(), TokenStoreError> {
    if tokens.is_valid() {
        Ok(())
    } else {
        Err(TokenStoreError::InvalidTokens {
            server: server.key().to_string(),
            username: username.to_string(),
        })
    }
}

/// Directory under which `.config/ufdl/` is created. Checks `APPDATA`, then
/// `XDG_CONFIG_HOME`, then the user's home directory.
pub fn config_dir() -> Option<Utf8PathBuf> {
    config_dir_from(|var| std::env::var(var).ok())
}

/// Default location of the token file: `<config dir>/.config/ufdl/tokens.json`
pub fn default_tokens_file() -> Option<Utf8PathBuf> {
    config_dir().map(|dir| dir.join(".config").join("ufdl").join("tokens.json"))
}

fn config_dir_from(lookup: impl Fn(&str) -> Option<String>) -> Option<Utf8PathBuf> {
    ["APPDATA", "XDG_CONFIG_HOME", "HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(lookup)
        .find(|dir| !dir.is_empty())
        .map(Utf8PathBuf::from)
}
