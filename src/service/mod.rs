//! Request dispatch core.
//!
//! A [`WatsonService`] holds the endpoint, credentials, default headers and
//! transport of one Watson service and turns [`RequestBuilder`]s into
//! [`ServiceCall`]s. Every call runs the same pipeline:
//! resolve URL, default headers, authentication, interceptors, transport,
//! then conversion of a 2xx body or mapping of the status to a typed error.

mod builder;
mod call;

pub use builder::ServiceBuilder;
pub use call::{FnCallback, ServiceCall, ServiceCallback, ServiceFuture, callback_fn};

use crate::auth::Authenticator;
use crate::error::{WatsonError, extract_error_message};
use crate::http::headers::{X_WATSON_AUTHORIZATION_TOKEN, sdk_headers, user_agent};
use crate::http::interceptor::{HttpInterceptor, HttpRequestContext};
use crate::http::media_type::TEXT_PLAIN;
use crate::http::request::RequestBuilder;
use crate::http::response::{Response, ResponseConverter, StringConverter};
use crate::http::transport::{HttpRequest, HttpTransport};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::sync::Arc;

const AUTH_HEADER_DEPRECATION_MESSAGE: &str = "Authenticating with the X-Watson-Authorization-Token \
    header is deprecated. The token continues to work with Cloud Foundry services, but is not \
    supported for services that use Identity and Access Management (IAM) authentication.";

pub(crate) struct ServiceInner {
    pub(crate) name: String,
    pub(crate) endpoint: String,
    pub(crate) default_endpoint: String,
    pub(crate) authenticator: Option<Authenticator>,
    pub(crate) default_headers: HeaderMap,
    pub(crate) skip_authentication: bool,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

/// Shared dispatch state of one Watson service. Cheap to clone.
#[derive(Clone)]
pub struct WatsonService {
    inner: Arc<ServiceInner>,
}

static_assertions::assert_impl_all!(WatsonService: Send, Sync);

impl WatsonService {
    pub fn builder(name: impl Into<String>, default_endpoint: impl Into<String>) -> ServiceBuilder {
        ServiceBuilder::new(name, default_endpoint)
    }

    pub(crate) fn from_inner(inner: ServiceInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Endpoint without a trailing `/`.
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn default_endpoint(&self) -> &str {
        &self.inner.default_endpoint
    }

    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.inner.authenticator.as_ref()
    }

    pub fn skip_authentication(&self) -> bool {
        self.inner.skip_authentication
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.default_headers
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.inner.transport.clone()
    }

    /// Wrap a request into a call. Request validation errors are reported
    /// through whichever completion mode the call is run with.
    pub fn create_call<C: ResponseConverter>(
        &self,
        request: RequestBuilder,
        converter: C,
    ) -> ServiceCall<C> {
        ServiceCall::new(self.clone(), request.build(), converter)
    }

    /// Call for a named service operation, tagged with SDK analytics headers.
    pub(crate) fn operation_call<C: ResponseConverter>(
        &self,
        version: &str,
        operation: &str,
        request: Result<RequestBuilder, WatsonError>,
        converter: C,
    ) -> ServiceCall<C> {
        match request {
            Ok(request) => {
                let request = request.headers(&sdk_headers(self.name(), version, operation));
                self.create_call(request, converter)
            }
            Err(e) => ServiceCall::new(self.clone(), Err(e), converter),
        }
    }

    /// Legacy authorization token for the service endpoint.
    ///
    /// `https://host/text-to-speech/api` asks
    /// `https://host/authorization/api/v1/token?url=https://host/text-to-speech/api`.
    pub fn get_token(&self) -> ServiceCall<StringConverter> {
        let request = token_url(self.endpoint()).map(|url| {
            RequestBuilder::get(url)
                .header(ACCEPT.as_str(), TEXT_PLAIN)
                .query("url", self.endpoint())
        });
        match request {
            Ok(request) => self.create_call(request, StringConverter),
            Err(e) => ServiceCall::new(self.clone(), Err(e), StringConverter),
        }
    }

    /// Absolute URL of `url`, resolving relative paths against the endpoint.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.is_empty() {
            self.endpoint().to_string()
        } else if url.starts_with('/') || url.starts_with('?') {
            format!("{}{url}", self.endpoint())
        } else {
            format!("{}/{url}", self.endpoint())
        }
    }

    /// Default headers, `User-Agent`, call headers and authentication.
    async fn prepare(
        &self,
        mut request: HttpRequest,
        call_headers: &HeaderMap,
    ) -> Result<HttpRequest, WatsonError> {
        request.url = self.resolve_url(&request.url);

        for (name, value) in &self.inner.default_headers {
            request.headers.insert(name.clone(), value.clone());
        }
        let mut agent = user_agent();
        if let Some(custom) = self.inner.default_headers.get(USER_AGENT)
            && let Ok(custom) = custom.to_str()
        {
            agent.push(' ');
            agent.push_str(custom);
        }
        let agent = HeaderValue::from_str(&agent)
            .map_err(|e| WatsonError::ConfigurationError(format!("Invalid user agent: {e}")))?;
        request.headers.insert(USER_AGENT, agent);

        for (name, value) in call_headers {
            request.headers.insert(name.clone(), value.clone());
        }

        match &self.inner.authenticator {
            Some(auth) => auth.apply(&mut request.headers).await?,
            None if self.inner.skip_authentication => {
                if request.headers.contains_key(X_WATSON_AUTHORIZATION_TOKEN) {
                    tracing::warn!(target: "watson_sdk::service", "{AUTH_HEADER_DEPRECATION_MESSAGE}");
                }
            }
            None => {
                return Err(WatsonError::MissingCredentials(
                    "apiKey or username and password were not specified".to_string(),
                ));
            }
        }
        Ok(request)
    }

    /// Run one request through the full pipeline.
    pub(crate) async fn dispatch<C: ResponseConverter>(
        &self,
        request: HttpRequest,
        call_headers: &HeaderMap,
        converter: &C,
    ) -> Result<Response<C::Output>, WatsonError> {
        let mut request = self.prepare(request, call_headers).await?;

        let ctx = HttpRequestContext {
            request_id: uuid::Uuid::new_v4().to_string(),
            service_name: self.inner.name.clone(),
            method: request.method,
            url: request.url.clone(),
        };
        for interceptor in &self.inner.interceptors {
            interceptor.on_before_send(&ctx, &mut request)?;
        }

        let response = match self.inner.transport.send(request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(target: "watson_sdk::service", "{} {}, error: {e}", ctx.method, ctx.url);
                self.notify_error(&ctx, &e);
                return Err(e);
            }
        };
        for interceptor in &self.inner.interceptors {
            interceptor.on_response(&ctx, response.status, &response.headers)?;
        }

        if response.is_success() {
            let (status, headers) = (response.status, response.headers);
            let result = converter.convert(response.body).await.inspect_err(|e| {
                self.notify_error(&ctx, e);
            })?;
            return Ok(Response::new(result, status, headers));
        }

        let (status, headers) = (response.status, response.headers);
        let body = match response.body.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(target: "watson_sdk::service", status=%status, err=%e, "failed to read error body");
                String::new()
            }
        };
        let message = extract_error_message(&body);
        tracing::error!(target: "watson_sdk::service", "{} {}, status: {status}, error: {message}", ctx.method, ctx.url);
        let err = WatsonError::from_response(status, message, headers, body);
        self.notify_error(&ctx, &err);
        Err(err)
    }

    fn notify_error(&self, ctx: &HttpRequestContext, error: &WatsonError) {
        for interceptor in &self.inner.interceptors {
            interceptor.on_error(ctx, error);
        }
    }
}

impl fmt::Debug for WatsonService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatsonService")
            .field("name", &self.inner.name)
            .field("endpoint", &self.inner.endpoint)
            .field("authenticator", &self.inner.authenticator)
            .field("skip_authentication", &self.inner.skip_authentication)
            .finish_non_exhaustive()
    }
}

fn token_url(endpoint: &str) -> Result<String, WatsonError> {
    let mut url = reqwest::Url::parse(endpoint)
        .map_err(|e| WatsonError::ConfigurationError(format!("Invalid endpoint '{endpoint}': {e}")))?;
    let mut segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    match segments.first_mut() {
        Some(first) => *first = "authorization".to_string(),
        None => segments.push("authorization".to_string()),
    }
    segments.push("v1".to_string());
    segments.push("token".to_string());
    url.set_path(&segments.join("/"));
    url.set_query(None);
    Ok(url.to_string())
}
