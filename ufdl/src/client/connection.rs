use super::actions::Actions;
use crate::auth::{Authentication, BearerAuth};
use crate::errors::UfdlError;
use crate::models::*;
use crate::tokenstore::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
use crate::types::{ServerUrl, Username};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use reqwest_middleware::{ClientWithMiddleware, Middleware, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A logged-in session with a UFDL server.
///
/// Every request made through a [Connection] is authenticated by
/// [BearerAuth]. A [Connection] can be shared between tasks.
pub struct Connection {
    client: ClientWithMiddleware,
    url: ServerUrl,
    auth: Arc<Authentication>,
    timeout: Duration,
}

pub struct ConnectionBuilder {
    url: ServerUrl,
    username: Username,
    password: String,
    storage: Option<Arc<dyn TokenStorage>>,
    connect_timeout: Duration,
    timeout: Duration,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ConnectionBuilder {
    pub(crate) fn new(url: ServerUrl, username: Username, password: String) -> Self {
        Self {
            url,
            username,
            password,
            storage: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            middleware: Vec::new(),
        }
    }

    /// Where tokens are kept between sessions. Defaults to a
    /// [FileTokenStorage] at its default location.
    pub fn token_storage(self, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage: Some(storage),
            ..self
        }
    }

    pub fn connect_timeout(self, connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            ..self
        }
    }

    /// Timeout of each API call, from connecting until the response body is
    /// read. File transfers have no overall limit: they fail only when no
    /// data arrives for this long.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Add middleware to the HTTP client. Added middleware runs before
    /// authentication, so a retried request is authenticated again.
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Create the connection. Tokens are not loaded or obtained until the
    /// first request.
    pub fn build(self) -> Result<Connection, UfdlError> {
        let client = reqwest::ClientBuilder::new()
            .default_headers(accept_json())
            .connect_timeout(self.connect_timeout)
            .build()?;
        let storage = self.storage.unwrap_or_else(default_storage);
        let auth = Arc::new(Authentication::new(
            client.clone(),
            self.url.clone(),
            self.username,
            self.password,
            storage,
        )
        .with_timeout(self.timeout));
        let builder = self
            .middleware
            .into_iter()
            .fold(reqwest_middleware::ClientBuilder::new(client), |b, m| {
                b.with_arc(m)
            })
            .with(BearerAuth::new(Arc::clone(&auth)));
        Ok(Connection {
            client: builder.build(),
            url: self.url,
            auth,
            timeout: self.timeout,
        })
    }

    /// Create the connection and make sure it has tokens.
    pub async fn connect(self) -> Result<Connection, UfdlError> {
        let connection = self.build()?;
        connection.auth.tokens().await?;
        Ok(connection)
    }
}

fn default_storage() -> Arc<dyn TokenStorage> {
    match FileTokenStorage::default_location() {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            debug!("{}, tokens will only be kept in memory", e);
            Arc::new(MemoryTokenStorage::new())
        }
    }
}

fn accept_json() -> HeaderMap {
    HeaderMap::from_iter([(ACCEPT, HeaderValue::from_static("application/json"))])
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection builder.
    pub fn build(
        url: ServerUrl,
        username: Username,
        password: impl Into<String>,
    ) -> ConnectionBuilder {
        ConnectionBuilder::new(url, username, password.into())
    }

    pub fn url(&self) -> &ServerUrl {
        &self.url
    }

    pub fn username(&self) -> &Username {
        self.auth.username()
    }

    pub fn authentication(&self) -> &Authentication {
        &self.auth
    }

    /// Full URL of an API path, e.g. `v1/core/datasets/`, followed by
    /// `segments` (percent-encoded as needed) and `query` parameters.
    pub fn endpoint(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, UfdlError> {
        let mut url = Url::parse(&self.url.join(path))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| UfdlError::InvalidArgument(format!("{} cannot have a path", self.url)))?
                .pop_if_empty()
                .extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Start an authenticated API call to [Connection::endpoint], limited by
    /// [ConnectionBuilder::timeout].
    pub fn request(
        &self,
        method: Method,
        path: &str,
        segments: &[&str],
    ) -> Result<RequestBuilder, UfdlError> {
        Ok(self.transfer(method, path, segments)?.timeout(self.timeout))
    }

    /// Like [Connection::request] but without a limit on the total duration,
    /// for uploading or downloading files. See [Connection::idle_timeout].
    pub fn transfer(
        &self,
        method: Method,
        path: &str,
        segments: &[&str],
    ) -> Result<RequestBuilder, UfdlError> {
        let url = self.endpoint(path, segments, &[])?;
        Ok(self.client.request(method, url))
    }

    /// Longest wait for a response or the next chunk of a download.
    pub fn idle_timeout(&self) -> Duration {
        self.timeout
    }

    /// Generic actions for any kind of [Resource].
    pub fn actions<R: Resource>(&self) -> Actions<'_, R> {
        Actions::new(self)
    }

    pub fn users(&self) -> Actions<'_, User> {
        self.actions()
    }

    pub fn teams(&self) -> Actions<'_, Team> {
        self.actions()
    }

    pub fn projects(&self) -> Actions<'_, Project> {
        self.actions()
    }

    pub fn licences(&self) -> Actions<'_, Licence> {
        self.actions()
    }

    pub fn domains(&self) -> Actions<'_, Domain> {
        self.actions()
    }

    pub fn frameworks(&self) -> Actions<'_, Framework> {
        self.actions()
    }

    pub fn nodes(&self) -> Actions<'_, Node> {
        self.actions()
    }

    pub fn datasets(&self) -> Actions<'_, Dataset> {
        self.actions()
    }

    pub fn docker_images(&self) -> Actions<'_, DockerImage> {
        self.actions()
    }

    pub fn job_templates(&self) -> Actions<'_, JobTemplate> {
        self.actions()
    }

    pub fn jobs(&self) -> Actions<'_, Job> {
        self.actions()
    }
}
