use serde::{Deserialize, Serialize};
use std::fmt;

/// A short-lived access token paired with the refresh token used to renew it.
///
/// [Tokens] are replaced as a whole whenever they change. On disk they are a
/// two-element JSON array `[access, refresh]`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Tokens {
    access: String,
    refresh: String,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Tokens which cannot be used for anything.
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn access(&self) -> &str {
        &self.access
    }

    pub fn refresh(&self) -> &str {
        &self.refresh
    }

    /// Both the access and the refresh token are present.
    pub fn is_valid(&self) -> bool {
        !self.access.is_empty() && !self.refresh.is_empty()
    }

    pub fn has_refresh(&self) -> bool {
        !self.refresh.is_empty()
    }

    pub fn invalidate(&mut self) {
        *self = Self::invalid();
    }

    /// Copy of these tokens with a new access token.
    pub(crate) fn with_access(&self, access: String) -> Self {
        Self {
            access,
            refresh: self.refresh.clone(),
        }
    }
}

impl From<(String, String)> for Tokens {
    fn from((access, refresh): (String, String)) -> Self {
        Self { access, refresh }
    }
}

impl From<Tokens> for (String, String) {
    fn from(tokens: Tokens) -> Self {
        (tokens.access, tokens.refresh)
    }
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}
