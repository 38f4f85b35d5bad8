//! Errors for this crate.
//! About anyhow: see https://github.com/TrueLayer/reqwest-middleware/issues/119

use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum InvalidServerUrl {
    #[error("Given URL does not start with \"http://\" or \"https://\": {0}")]
    Protocol(String),

    #[error("Given URL is malformed: {0}")]
    Malformed(String),
}

aliri_braid::from_infallible!(InvalidServerUrl);

/// Errors representing failed interactions with a UFDL server.
#[derive(thiserror::Error, Debug)]
pub enum UfdlError {
    /// Error response from the server, after any authentication retries.
    #[error("({status:?} {reason:?}): {text}")]
    Error {
        status: StatusCode,
        reason: &'static str,
        text: String,
        source: reqwest::Error,
    },

    /// Transport error, or a response body which could not be decoded.
    #[error(transparent)]
    Raw(#[from] reqwest::Error),

    /// Tokens could not be obtained or refreshed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Error from reqwest middleware function.
    #[error(transparent)]
    Middleware(anyhow::Error),

    /// A file transfer received nothing for longer than the idle timeout.
    #[error("No data received for {0:?}")]
    Stalled(std::time::Duration),

    /// An argument was rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UfdlError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UfdlError::Error { status, .. } => Some(*status),
            UfdlError::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            UfdlError::Raw(e) => e.status(),
            _ => None,
        }
    }
}

impl From<reqwest_middleware::Error> for UfdlError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(e) => match e.downcast::<AuthError>() {
                Ok(auth) => UfdlError::Auth(auth),
                Err(e) => UfdlError::Middleware(e),
            },
            reqwest_middleware::Error::Reqwest(e) => UfdlError::Raw(e),
        }
    }
}

/// Failure to obtain or refresh authentication tokens.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// The server refused the credentials or the refresh token.
    #[error("Authentication rejected ({status:?}): {text}")]
    Rejected { status: StatusCode, text: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// A filter expression which cannot be built.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Field name must not be empty")]
    EmptyField,

    #[error("Value for field \"{0}\" must not be empty")]
    EmptyValue(String),

    #[error("Logical expressions need at least 2 sub-expressions, got {0}")]
    TooFewSubExpressions(usize),

    #[error("An \"and\" expression cannot directly contain an \"or\" expression")]
    OrInsideAnd,

    #[error("Value for field \"{0}\" must be a finite number")]
    NonFiniteNumber(String),

    #[error("Only logical expressions accept sub-expressions")]
    NotLogical,
}

/// Failure to persist tokens. These are reported, never raised as panics.
#[derive(thiserror::Error, Debug)]
pub enum TokenStoreError {
    #[error("Refusing to store invalid tokens for \"{username}\" on {server}")]
    InvalidTokens { server: String, username: String },

    #[error("No configuration directory found: set APPDATA, XDG_CONFIG_HOME or HOME")]
    NoConfigDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid client configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    Missing(&'static str),

    #[error(transparent)]
    Url(#[from] InvalidServerUrl),

    #[error("Environment variable {var} is not a number of seconds: \"{value}\"")]
    NotSeconds { var: &'static str, value: String },

    #[error("Unknown token store \"{0}\", expected \"file\" or \"memory\"")]
    TokenStore(String),
}

pub(crate) async fn check(res: reqwest::Response) -> Result<reqwest::Response, UfdlError> {
    match res.error_for_status_ref() {
        Ok(_) => Ok(res),
        Err(source) => {
            let status = res.status();
            let reason = status.canonical_reason().unwrap_or("unknown reason");
            // the body is informational, keep the status even if it cannot be read
            let text = res.text().await.unwrap_or_default();
            Err(UfdlError::Error {
                status,
                reason,
                text,
                source,
            })
        }
    }
}
