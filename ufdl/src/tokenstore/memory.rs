use super::{ensure_storable, TokenStorage};
use crate::auth::Tokens;
use crate::errors::TokenStoreError;
use crate::types::{ServerUrl, Username};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Keeps tokens in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<HashMap<(String, String), Tokens>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(server: &ServerUrl, username: &Username) -> (String, String) {
    (server.key().to_string(), username.to_string())
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, server: &ServerUrl, username: &Username) -> Tokens {
        let tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens
            .get(&key(server, username))
            .cloned()
            .unwrap_or_default()
    }

    fn store(
        &self,
        server: &ServerUrl,
        username: &Username,
        tokens: &Tokens,
    ) -> Result<(), TokenStoreError> {
        ensure_storable(server, username, tokens)?;
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(server, username), tokens.clone());
        Ok(())
    }

    fn remove(&self, server: &ServerUrl, username: &Username) -> Result<bool, TokenStoreError> {
        let removed = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key(server, username));
        Ok(removed.is_some())
    }
}
