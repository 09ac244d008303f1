//! Authentication helpers and token providers.
//!
//! An [`Authenticator`] decides the `Authorization` header of every request:
//! basic credentials, a legacy api key, or a bearer token supplied by a
//! [`TokenProvider`] such as the [`IamTokenManager`].

pub mod iam;

pub use iam::{IamOptions, IamToken, IamTokenManager};

use crate::defaults::credentials::{APIKEY_AS_USERNAME, ICP_PREFIX};
use crate::error::WatsonError;
use crate::http::headers::{BASIC_PREFIX, HttpHeaderBuilder};
use crate::http::transport::HttpTransport;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// Supplies tokens for the `Authorization: Bearer <token>` header.
///
/// Implementations may cache internally and refresh tokens when necessary.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, WatsonError>;
}

/// A token managed outside this crate.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, WatsonError> {
        Ok(self.token.expose_secret().to_string())
    }
}

/// How requests are authenticated.
#[derive(Clone)]
pub enum Authenticator {
    /// `Authorization: Basic base64(username:password)`
    Basic {
        username: String,
        password: SecretString,
    },
    /// Pre-encoded basic credential; `Basic ` is prepended when missing.
    ApiKey(SecretString),
    /// `Authorization: Bearer <token>`
    Bearer(Arc<dyn TokenProvider>),
}

impl Authenticator {
    /// Username and password. The pair `apikey` / `<key>` is an IAM api key
    /// and is exchanged for bearer tokens, unless the key is an IBM Cloud
    /// Private key (`icp-` prefix).
    pub fn username_password(
        username: &str,
        password: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, WatsonError> {
        if has_bad_start_or_end_char(username) || has_bad_start_or_end_char(password) {
            return Err(WatsonError::ConfigurationError(
                "The username and password shouldn't start or end with curly brackets or quotes. \
                 Please remove any surrounding {, }, or \" characters."
                    .to_string(),
            ));
        }
        if username == APIKEY_AS_USERNAME && !password.starts_with(ICP_PREFIX) {
            let manager = IamTokenManager::new(IamOptions::new().api_key(password), transport)?;
            return Ok(Self::Bearer(Arc::new(manager)));
        }
        Ok(Self::Basic {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        })
    }

    pub fn api_key(api_key: &str) -> Result<Self, WatsonError> {
        if has_bad_start_or_end_char(api_key) {
            return Err(WatsonError::ConfigurationError(
                "The API key shouldn't start or end with curly brackets or quotes. \
                 Please remove any surrounding {, }, or \" characters."
                    .to_string(),
            ));
        }
        Ok(Self::ApiKey(SecretString::from(api_key.to_string())))
    }

    /// IAM token exchange.
    pub fn iam(options: IamOptions, transport: Arc<dyn HttpTransport>) -> Result<Self, WatsonError> {
        Ok(Self::Bearer(Arc::new(IamTokenManager::new(options, transport)?)))
    }

    /// A bearer token managed by the caller.
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::Bearer(Arc::new(StaticTokenProvider::new(token)))
    }

    pub fn token_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self::Bearer(provider)
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } | Self::ApiKey(_) => "basic",
            Self::Bearer(_) => "bearer",
        }
    }

    /// Set the `Authorization` header.
    pub async fn apply(&self, headers: &mut HeaderMap) -> Result<(), WatsonError> {
        let builder = HttpHeaderBuilder::from_headers(std::mem::take(headers));
        let builder = match self {
            Self::Basic { username, password } => {
                builder.with_basic_auth(username, password.expose_secret())?
            }
            Self::ApiKey(key) => {
                let key = key.expose_secret();
                if key.starts_with(BASIC_PREFIX) {
                    builder.with_authorization(key)?
                } else {
                    builder.with_authorization(&format!("{BASIC_PREFIX}{key}"))?
                }
            }
            Self::Bearer(provider) => builder.with_bearer_auth(&provider.token().await?)?,
        };
        *headers = builder.build();
        Ok(())
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

/// Credential values copied from a JSON document often keep their
/// surrounding braces or quotes.
pub fn has_bad_start_or_end_char(value: &str) -> bool {
    value.starts_with('{') || value.starts_with('"') || value.ends_with('}') || value.ends_with('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::{HttpRequest, HttpResponse};
    use reqwest::header::AUTHORIZATION;

    struct NoTransport;

    #[async_trait]
    impl HttpTransport for NoTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, WatsonError> {
            Err(WatsonError::HttpError("offline".into()))
        }
    }

    fn transport() -> Arc<dyn HttpTransport> {
        Arc::new(NoTransport)
    }

    #[tokio::test]
    async fn basic_credentials_are_encoded() {
        let auth = Authenticator::username_password("user", "pass", transport()).unwrap();
        let mut headers = HeaderMap::new();
        auth.apply(&mut headers).await.unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
    }

    #[tokio::test]
    async fn api_key_gets_basic_prefix_once() {
        let mut headers = HeaderMap::new();
        Authenticator::api_key("abc").unwrap().apply(&mut headers).await.unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic abc");

        Authenticator::api_key("Basic xyz").unwrap().apply(&mut headers).await.unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic xyz");
    }

    #[test]
    fn apikey_username_switches_to_iam_except_icp() {
        let auth = Authenticator::username_password("apikey", "secret", transport()).unwrap();
        assert_eq!(auth.scheme(), "bearer");
        let auth = Authenticator::username_password("apikey", "icp-secret", transport()).unwrap();
        assert_eq!(auth.scheme(), "basic");
    }

    #[test]
    fn surrounding_braces_and_quotes_are_rejected() {
        for bad in ["{key", "key}", "\"key", "key\""] {
            assert!(matches!(
                Authenticator::api_key(bad),
                Err(WatsonError::ConfigurationError(_))
            ));
        }
        assert!(Authenticator::username_password("\"user\"", "p", transport()).is_err());
    }

    #[tokio::test]
    async fn bearer_token_is_applied() {
        let mut headers = HeaderMap::new();
        Authenticator::bearer_token("t0k3n")
            .apply(&mut headers)
            .await
            .unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer t0k3n");
    }

    #[test]
    fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("fixed");
        assert_eq!(tokio_test::block_on(provider.token()).unwrap(), "fixed");
    }

    #[test]
    fn debug_hides_secrets() {
        let auth = Authenticator::username_password("user", "hunter2", transport()).unwrap();
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
