//! NewTypes for values used by users when first connecting to a UFDL server.

use crate::errors::InvalidServerUrl;
use aliri_braid::braid;

/// A [ServerUrl] is the base URL of a UFDL server, e.g.
/// `http://localhost:8000` or `https://ufdl.example.org/`
#[braid(validator, serde)]
pub struct ServerUrl(String);

impl aliri_braid::Validator for ServerUrl {
    type Error = InvalidServerUrl;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if !(s.starts_with("http://") || s.starts_with("https://")) {
            Err(InvalidServerUrl::Protocol(s.to_string()))
        } else if url::Url::parse(s).is_err() {
            Err(InvalidServerUrl::Malformed(s.to_string()))
        } else {
            Ok(())
        }
    }
}

impl ServerUrl {
    /// The URL without trailing slashes. Stored tokens are keyed by this value.
    pub fn key(&self) -> &str {
        self.as_str().trim_end_matches('/')
    }

    /// Append an API path such as `v1/core/datasets/` to this base URL.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.key(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("http://localhost:8000")]
    #[case("http://localhost:8000/")]
    #[case("https://ufdl.example.org/")]
    fn test_parse_url(#[case] url: &str) {
        assert!(ServerUrl::try_from(url).is_ok());
    }

    #[rstest]
    #[case("idk://localhost/")]
    #[case("localhost:8000")]
    fn test_reject_bad_protocol(#[case] url: &str) {
        assert!(matches!(
            ServerUrl::try_from(url).unwrap_err(),
            InvalidServerUrl::Protocol { .. }
        ))
    }

    #[rstest]
    #[case("http://")]
    #[case("https://exa mple.org")]
    fn test_reject_malformed(#[case] url: &str) {
        assert!(matches!(
            ServerUrl::try_from(url).unwrap_err(),
            InvalidServerUrl::Malformed { .. }
        ))
    }

    #[rstest]
    #[case("http://localhost:8000", "http://localhost:8000/v1/auth/obtain/")]
    #[case("http://localhost:8000/", "http://localhost:8000/v1/auth/obtain/")]
    #[case("http://localhost:8000//", "http://localhost:8000/v1/auth/obtain/")]
    fn test_join(#[case] url: &'static str, #[case] expected: &str) {
        let url = ServerUrl::from_static(url);
        assert_eq!(url.join("v1/auth/obtain/"), expected);
        assert_eq!(url.join("/v1/auth/obtain/"), expected);
        assert!(!url.key().ends_with('/'));
    }
}
