//! IAM bearer token manager.
//!
//! Source of the token, in order:
//! 1) An access token supplied by the caller (never refreshed here)
//! 2) A cached managed token that is still inside its refresh window
//! 3) A refreshed token, when a refresh token is held
//! 4) A new token exchanged for the api key
//!
//! Managed tokens are refreshed once 80% of their lifetime has elapsed.

use crate::auth::TokenProvider;
use crate::defaults::iam::{
    CLIENT_AUTHORIZATION, DEFAULT_URL, GRANT_TYPE_API_KEY, GRANT_TYPE_REFRESH, REFRESH_FRACTION,
    RESPONSE_TYPE,
};
use crate::error::{WatsonError, extract_error_message};
use crate::http::media_type::APPLICATION_FORM_URLENCODED;
use crate::http::request::RequestBuilder;
use crate::http::transport::HttpTransport;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// IAM configuration.
#[derive(Debug, Clone, Default)]
pub struct IamOptions {
    pub api_key: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub url: Option<String>,
}

impl IamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// A caller-managed access token. It is sent as-is until replaced.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Token response of the IAM service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IamToken {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Expiry as a unix timestamp in seconds.
    pub expiration: Option<i64>,
}

impl IamToken {
    /// True once the refresh window has been reached at `now` (unix seconds),
    /// or when the expiry fields are missing.
    pub fn is_expired_at(&self, now: i64) -> bool {
        let (Some(expires_in), Some(expiration)) = (self.expires_in, self.expiration) else {
            return true;
        };
        let refresh_time = expiration as f64 - expires_in as f64 * (1.0 - REFRESH_FRACTION);
        refresh_time < now as f64
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Retrieves, caches and refreshes IAM tokens.
pub struct IamTokenManager {
    api_key: Option<SecretString>,
    user_access_token: Option<SecretString>,
    url: String,
    transport: Arc<dyn HttpTransport>,
    // Held across the exchange so concurrent callers share one request.
    cache: Mutex<Option<IamToken>>,
}

impl std::fmt::Debug for IamTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamTokenManager")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl IamTokenManager {
    pub fn new(options: IamOptions, transport: Arc<dyn HttpTransport>) -> Result<Self, WatsonError> {
        if options.api_key.is_none() && options.access_token.is_none() {
            return Err(WatsonError::MissingCredentials(
                "IAM requires an api key or an access token".to_string(),
            ));
        }
        if let Some(key) = &options.api_key
            && crate::auth::has_bad_start_or_end_char(key.expose_secret())
        {
            return Err(WatsonError::ConfigurationError(
                "The IAM api key shouldn't start or end with curly brackets or quotes. \
                 Please remove any surrounding {, }, or \" characters."
                    .to_string(),
            ));
        }
        Ok(Self {
            api_key: options.api_key,
            user_access_token: options.access_token,
            url: options.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            transport,
            cache: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// A valid access token.
    pub async fn get_token(&self) -> Result<String, WatsonError> {
        if let Some(token) = &self.user_access_token {
            return Ok(token.expose_secret().to_string());
        }

        let mut cache = self.cache.lock().await;
        let cached = cache.as_ref().filter(|t| t.access_token.is_some());
        let token = match cached {
            Some(t) if !t.is_expired() => return access_token_of(t),
            Some(t) => match t.refresh_token.clone() {
                Some(refresh) => match self.refresh_token(&refresh).await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::warn!(target: "watson_sdk::auth", err=%e, "IAM refresh failed, requesting a new token");
                        self.request_token().await?
                    }
                },
                None => self.request_token().await?,
            },
            None => self.request_token().await?,
        };
        let access = access_token_of(&token)?;
        *cache = Some(token);
        Ok(access)
    }

    /// Exchange the api key for a new token.
    pub async fn request_token(&self) -> Result<IamToken, WatsonError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            WatsonError::MissingCredentials("IAM api key is not set".to_string())
        })?;
        tracing::debug!(target: "watson_sdk::auth", url=%self.url, "requesting IAM token");
        let request = self
            .token_request()
            .form("grant_type", GRANT_TYPE_API_KEY)
            .form("apikey", api_key.expose_secret())
            .form("response_type", RESPONSE_TYPE);
        self.send(request).await
    }

    /// Trade a refresh token for a new token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<IamToken, WatsonError> {
        tracing::debug!(target: "watson_sdk::auth", url=%self.url, "refreshing IAM token");
        let request = self
            .token_request()
            .form("grant_type", GRANT_TYPE_REFRESH)
            .form("refresh_token", refresh_token);
        self.send(request).await
    }

    fn token_request(&self) -> RequestBuilder {
        RequestBuilder::post(self.url.clone())
            .header(CONTENT_TYPE.as_str(), APPLICATION_FORM_URLENCODED)
            .header(AUTHORIZATION.as_str(), CLIENT_AUTHORIZATION)
    }

    async fn send(&self, request: RequestBuilder) -> Result<IamToken, WatsonError> {
        let response = self.transport.send(request.build()?).await?;
        let success = response.is_success();
        let status = response.status;
        let headers = response.headers.clone();
        let body = response.body.bytes().await?;
        if !success {
            let text = String::from_utf8_lossy(&body).into_owned();
            let message = extract_error_message(&text);
            tracing::error!(target: "watson_sdk::auth", status=%status, error=%message, "IAM token request failed");
            return Err(WatsonError::from_response(status, message, headers, text));
        }
        serde_json::from_slice(&body)
            .map_err(|e| WatsonError::ParseError(format!("Failed to parse IAM token response: {e}")))
    }
}

fn access_token_of(token: &IamToken) -> Result<String, WatsonError> {
    token
        .access_token
        .clone()
        .ok_or_else(|| WatsonError::ParseError("IAM response has no access_token".to_string()))
}

#[async_trait]
impl TokenProvider for IamTokenManager {
    async fn token(&self) -> Result<String, WatsonError> {
        self.get_token().await
    }
}
