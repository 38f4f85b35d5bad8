use super::Authentication;
use crate::errors::AuthError;
use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next, Result};
use std::fmt;
use std::sync::Arc;
use task_local_extensions::Extensions;

/// Middleware which adds `Authorization: Bearer <access>` to every request.
///
/// When the server answers 401, the access token is refreshed and the request
/// is sent again. If that is also answered with 401, new tokens are obtained
/// and the request is sent a last time. Whatever the server answers then is
/// returned.
#[derive(Clone)]
pub struct BearerAuth {
    auth: Arc<Authentication>,
}

impl BearerAuth {
    pub fn new(auth: Arc<Authentication>) -> Self {
        Self { auth }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Escalation {
    Refresh,
    Obtain,
}

impl Escalation {
    const STEPS: [Escalation; 2] = [Escalation::Refresh, Escalation::Obtain];
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escalation::Refresh => write!(f, "refresh"),
            Escalation::Obtain => write!(f, "obtain"),
        }
    }
}

#[async_trait::async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let tokens = self.auth.tokens().await.map_err(to_middleware)?;
        let mut access = tokens.access().to_string();
        let method = req.method().clone();
        let url = req.url().clone();

        debug!("{} {}", method, url);
        let mut replay = req.try_clone();
        let mut res = next
            .clone()
            .run(authorize(req, &access)?, extensions)
            .await?;

        for step in Escalation::STEPS {
            if res.status() != StatusCode::UNAUTHORIZED {
                break;
            }
            let Some(req) = replay.take() else {
                debug!("{} {} has a streaming body and cannot be sent again", method, url);
                break;
            };
            let renewed = match step {
                Escalation::Refresh => self.auth.refresh_after(&access).await,
                Escalation::Obtain => self.auth.obtain_after(&access).await,
            };
            match renewed {
                Ok(tokens) => {
                    access = tokens.access().to_string();
                    replay = req.try_clone();
                    debug!("{} {} again after token {}", method, url, step);
                    res = next
                        .clone()
                        .run(authorize(req, &access)?, extensions)
                        .await?;
                }
                Err(AuthError::Rejected { status, .. }) => {
                    warn!("Token {} for {} {} was rejected ({})", step, method, url, status);
                    replay = Some(req);
                }
                Err(e) => return Err(to_middleware(e)),
            }
        }
        Ok(res)
    }
}

fn authorize(mut req: Request, access: &str) -> Result<Request> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", access))
        .map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
    value.set_sensitive(true);
    req.headers_mut().insert(AUTHORIZATION, value);
    Ok(req)
}

fn to_middleware(e: AuthError) -> reqwest_middleware::Error {
    reqwest_middleware::Error::Middleware(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_sets_sensitive_header() {
        let req = Request::new(
            reqwest::Method::GET,
            "http://localhost:8000/v1/core/users/".parse().unwrap(),
        );
        let req = authorize(req, "a1").unwrap();
        let value = req.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(value, "Bearer a1");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_authorize_replaces_header() {
        let req = Request::new(
            reqwest::Method::GET,
            "http://localhost:8000/v1/core/users/".parse().unwrap(),
        );
        let req = authorize(authorize(req, "a1").unwrap(), "a2").unwrap();
        let values: Vec<_> = req.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values, vec!["Bearer a2"]);
    }

    #[test]
    fn test_escalation_order() {
        assert_eq!(Escalation::STEPS, [Escalation::Refresh, Escalation::Obtain]);
        assert_eq!(Escalation::Obtain.to_string(), "obtain");
    }
}
