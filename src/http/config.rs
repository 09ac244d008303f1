//! HTTP configuration types.
//!
//! `HttpConfig` and its builder configure the `reqwest` client used by every
//! service.

use crate::error::WatsonError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Connection timeout
    #[serde(with = "duration_option_serde")]
    pub connect_timeout: Option<Duration>,
    /// Headers sent by the client on every request
    pub headers: HashMap<String, String>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Basic credentials for the proxy
    #[serde(skip)]
    pub proxy_credentials: Option<(String, SecretString)>,
    /// Accept any server certificate. Only for private deployments with
    /// self-signed certificates.
    pub disable_ssl_verification: bool,
    /// Overrides the client-level user agent. The dispatch core still sets
    /// its own `User-Agent` header per request.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(crate::defaults::http::REQUEST_TIMEOUT),
            connect_timeout: Some(crate::defaults::http::CONNECT_TIMEOUT),
            headers: HashMap::new(),
            proxy: None,
            proxy_credentials: None,
            disable_ssl_verification: false,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }

    /// Build a `reqwest::Client` from this configuration.
    pub fn build_client(&self) -> Result<reqwest::Client, WatsonError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(proxy_url) = &self.proxy {
            let mut proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| WatsonError::ConfigurationError(format!("Invalid proxy URL: {e}")))?;
            if let Some((user, password)) = &self.proxy_credentials {
                proxy = proxy.basic_auth(user, password.expose_secret());
            }
            builder = builder.proxy(proxy);
        }

        if self.disable_ssl_verification {
            tracing::warn!(target: "watson_sdk::http", "SSL certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if !self.headers.is_empty() {
            let headers = crate::http::headers::HttpHeaderBuilder::new()
                .with_custom_headers(&self.headers)?
                .build();
            builder = builder.default_headers(headers);
        }

        builder
            .build()
            .map_err(|e| WatsonError::HttpError(format!("Failed to create HTTP client: {e}")))
    }
}

/// Builder for `HttpConfig`
#[derive(Debug, Clone, Default)]
pub struct HttpConfigBuilder {
    config: Option<HttpConfig>,
}

impl HttpConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn config(&mut self) -> &mut HttpConfig {
        self.config.get_or_insert_with(HttpConfig::default)
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config().timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.config().connect_timeout = connect_timeout;
        self
    }

    pub fn proxy<S: Into<String>>(mut self, proxy: Option<S>) -> Self {
        self.config().proxy = proxy.map(Into::into);
        self
    }

    pub fn proxy_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config().proxy_credentials =
            Some((username.into(), SecretString::from(password.into())));
        self
    }

    pub fn disable_ssl_verification(mut self, disable: bool) -> Self {
        self.config().disable_ssl_verification = disable;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.config().user_agent = user_agent.map(Into::into);
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config().headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> HttpConfig {
        self.config.unwrap_or_default()
    }
}

mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_builds() {
        assert!(HttpConfig::default().build_client().is_ok());
    }

    #[test]
    fn builder_keeps_defaults_for_unset_fields() {
        let config = HttpConfig::builder().disable_ssl_verification(true).build();
        assert_eq!(config.timeout, Some(crate::defaults::http::REQUEST_TIMEOUT));
        assert!(config.disable_ssl_verification);
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn invalid_proxy_is_configuration_error() {
        let config = HttpConfig::builder().proxy(Some("::not a url::")).build();
        assert!(matches!(
            config.build_client(),
            Err(WatsonError::ConfigurationError(_))
        ));
    }

    #[test]
    fn timeouts_serialize_as_seconds() {
        let config = HttpConfig::builder()
            .timeout(Some(Duration::from_secs(5)))
            .connect_timeout(None)
            .build();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout"], 5);
        assert!(json["connect_timeout"].is_null());
    }
}
