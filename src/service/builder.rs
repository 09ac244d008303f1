//! `WatsonService` builder.

use super::{ServiceInner, WatsonService};
use crate::auth::{Authenticator, IamOptions, has_bad_start_or_end_char};
use crate::config::ServiceCredentials;
use crate::error::WatsonError;
use crate::http::config::HttpConfig;
use crate::http::headers::{header_name, header_value};
use crate::http::interceptor::{HttpInterceptor, LoggingInterceptor};
use crate::http::transport::{HttpTransport, ReqwestTransport};
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for a [`WatsonService`].
///
/// Authentication is chosen at `build()`, first match wins:
/// an explicit authenticator or bearer token, IAM options, then the
/// collected [`ServiceCredentials`] (IAM api key, username/password,
/// legacy api key).
#[derive(Clone)]
pub struct ServiceBuilder {
    name: String,
    default_endpoint: String,
    endpoint: Option<String>,
    credentials: ServiceCredentials,
    iam_options: Option<IamOptions>,
    authenticator: Option<Authenticator>,
    default_headers: HashMap<String, String>,
    skip_authentication: bool,
    http_config: HttpConfig,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn HttpTransport>>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    http_debug: bool,
}

impl ServiceBuilder {
    pub fn new(name: impl Into<String>, default_endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_endpoint: default_endpoint.into(),
            endpoint: None,
            credentials: ServiceCredentials::default(),
            iam_options: None,
            authenticator: None,
            default_headers: HashMap::new(),
            skip_authentication: false,
            http_config: HttpConfig::default(),
            http_client: None,
            transport: None,
            interceptors: Vec::new(),
            http_debug: false,
        }
    }

    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn username_and_password<U: Into<String>, P: Into<String>>(
        mut self,
        username: U,
        password: P,
    ) -> Self {
        self.credentials.username = Some(username.into());
        self.credentials.password = Some(password.into());
        self
    }

    /// Legacy api key, sent as basic credentials.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.credentials.api_key = Some(api_key.into());
        self
    }

    pub fn iam_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.credentials.iam_api_key = Some(api_key.into());
        self
    }

    pub fn iam_url<S: Into<String>>(mut self, url: S) -> Self {
        self.credentials.iam_url = Some(url.into());
        self
    }

    pub fn iam_options(mut self, options: IamOptions) -> Self {
        self.iam_options = Some(options);
        self
    }

    pub fn bearer_token<S: Into<String>>(mut self, token: S) -> Self {
        self.authenticator = Some(Authenticator::bearer_token(token));
        self
    }

    pub fn authenticator(mut self, authenticator: Authenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Merge discovered credentials; fields set here replace earlier ones.
    pub fn credentials(mut self, credentials: ServiceCredentials) -> Self {
        self.credentials = std::mem::take(&mut self.credentials).merge(credentials);
        self
    }

    /// Merge credentials from `VCAP_SERVICES` and `ibm-credentials.env`.
    pub fn from_environment(self) -> Self {
        let discovered = ServiceCredentials::from_environment(&self.name);
        self.credentials(discovered)
    }

    /// Header sent on every request. A `User-Agent` here is appended to the
    /// SDK user agent.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn custom_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Send requests without credentials, e.g. behind a gateway that
    /// injects them.
    pub fn skip_authentication(mut self, skip: bool) -> Self {
        self.skip_authentication = skip;
        self
    }

    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the network layer, e.g. with a fake backend in tests.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_http_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Log every request and response at debug level.
    pub fn http_debug(mut self, enabled: bool) -> Self {
        self.http_debug = enabled;
        self
    }

    pub fn build(self) -> Result<WatsonService, WatsonError> {
        let transport: Arc<dyn HttpTransport> = match (self.transport, self.http_client) {
            (Some(t), _) => t,
            (None, Some(client)) => Arc::new(ReqwestTransport::new(client)),
            (None, None) => Arc::new(ReqwestTransport::from_config(&self.http_config)?),
        };

        let default_endpoint = normalize_endpoint(&self.default_endpoint)?;
        let endpoint = match self.endpoint.as_deref().or(self.credentials.url.as_deref()) {
            Some(e) if !e.is_empty() => normalize_endpoint(e)?,
            _ => default_endpoint.clone(),
        };
        if endpoint.is_empty() {
            return Err(WatsonError::ConfigurationError(format!(
                "No endpoint configured for service '{}'",
                self.name
            )));
        }

        let authenticator = match (self.authenticator, self.iam_options) {
            (Some(a), _) => Some(a),
            (None, Some(options)) => Some(Authenticator::iam(options, transport.clone())?),
            (None, None) => self.credentials.authenticator(transport.clone())?,
        };

        let mut default_headers = HeaderMap::new();
        for (k, v) in &self.default_headers {
            default_headers.insert(header_name(k)?, header_value(v)?);
        }

        let mut interceptors = self.interceptors;
        if self.http_debug {
            interceptors.push(Arc::new(LoggingInterceptor));
        }

        tracing::debug!(
            target: "watson_sdk::service",
            service=%self.name,
            endpoint=%endpoint,
            auth=%authenticator.as_ref().map(Authenticator::scheme).unwrap_or("none"),
            "service configured"
        );

        Ok(WatsonService::from_inner(ServiceInner {
            name: self.name,
            endpoint,
            default_endpoint,
            authenticator,
            default_headers,
            skip_authentication: self.skip_authentication,
            transport,
            interceptors,
        }))
    }
}

fn normalize_endpoint(endpoint: &str) -> Result<String, WatsonError> {
    if has_bad_start_or_end_char(endpoint) {
        return Err(WatsonError::ConfigurationError(
            "The URL shouldn't start or end with curly brackets or quotes. \
             Please remove any surrounding {, }, or \" characters."
                .to_string(),
        ));
    }
    Ok(endpoint.strip_suffix('/').unwrap_or(endpoint).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_precedence_and_trailing_slash() {
        let svc = ServiceBuilder::new("tts", "https://default/api/")
            .skip_authentication(true)
            .build()
            .unwrap();
        assert_eq!(svc.endpoint(), "https://default/api");

        let svc = ServiceBuilder::new("tts", "https://default/api")
            .credentials(ServiceCredentials {
                url: Some("https://from-creds/api".into()),
                ..Default::default()
            })
            .skip_authentication(true)
            .build()
            .unwrap();
        assert_eq!(svc.endpoint(), "https://from-creds/api");

        let svc = ServiceBuilder::new("tts", "https://default/api")
            .endpoint("https://explicit/api/")
            .skip_authentication(true)
            .build()
            .unwrap();
        assert_eq!(svc.endpoint(), "https://explicit/api");
        assert_eq!(svc.default_endpoint(), "https://default/api");
    }

    #[test]
    fn quoted_endpoint_is_rejected() {
        let err = ServiceBuilder::new("tts", "https://default/api")
            .endpoint("\"https://x/api\"")
            .build()
            .unwrap_err();
        assert!(matches!(err, WatsonError::ConfigurationError(_)));
    }

    #[test]
    fn iam_key_wins_over_basic_credentials() {
        let svc = ServiceBuilder::new("tts", "https://h/api")
            .username_and_password("u", "p")
            .iam_api_key("key")
            .build()
            .unwrap();
        assert_eq!(svc.authenticator().map(Authenticator::scheme), Some("bearer"));

        let svc = ServiceBuilder::new("tts", "https://h/api")
            .username_and_password("u", "p")
            .api_key("legacy")
            .build()
            .unwrap();
        assert_eq!(svc.authenticator().map(Authenticator::scheme), Some("basic"));
    }

    #[test]
    fn invalid_default_header_fails_build() {
        let err = ServiceBuilder::new("tts", "https://h/api")
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, WatsonError::ConfigurationError(_)));
    }
}
