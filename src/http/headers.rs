//! HTTP Headers Utility
//!
//! Header names and builders shared by the dispatch core and the services.

use crate::defaults::{SDK_NAME, SDK_VERSION};
use crate::error::WatsonError;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

pub const X_WATSON_AUTHORIZATION_TOKEN: &str = "X-Watson-Authorization-Token";
pub const X_WATSON_LEARNING_OPT_OUT: &str = "X-Watson-Learning-Opt-Out";
pub const X_IBMCLOUD_SDK_ANALYTICS: &str = "X-IBMCloud-SDK-Analytics";

pub const BASIC_PREFIX: &str = "Basic ";
pub const BEARER_PREFIX: &str = "Bearer ";

/// HTTP header builder for Watson requests
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Start from an existing header map.
    pub fn from_headers(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// `Authorization: Basic base64(username:password)`
    pub fn with_basic_auth(self, username: &str, password: &str) -> Result<Self, WatsonError> {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.with_authorization(&format!("{BASIC_PREFIX}{encoded}"))
    }

    /// `Authorization: Bearer <token>`
    pub fn with_bearer_auth(self, token: &str) -> Result<Self, WatsonError> {
        self.with_authorization(&format!("{BEARER_PREFIX}{token}"))
    }

    /// Raw `Authorization` value.
    pub fn with_authorization(mut self, value: &str) -> Result<Self, WatsonError> {
        let mut value = HeaderValue::from_str(value).map_err(|e| {
            WatsonError::ConfigurationError(format!("Invalid credential format: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Add a custom header, replacing any value already present.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, WatsonError> {
        self.headers.insert(header_name(name)?, header_value(value)?);
        Ok(self)
    }

    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, WatsonError> {
        for (key, value) in custom_headers {
            self.headers.insert(header_name(key)?, header_value(value)?);
        }
        Ok(self)
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HttpHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn header_name(name: &str) -> Result<HeaderName, WatsonError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| WatsonError::ConfigurationError(format!("Invalid header name '{name}': {e}")))
}

pub(crate) fn header_value(value: &str) -> Result<HeaderValue, WatsonError> {
    HeaderValue::from_str(value).map_err(|e| {
        WatsonError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
    })
}

/// Merge extra headers into base headers. Extra headers override base headers
/// with the same name; invalid entries are skipped.
pub fn merge_headers(mut base: HeaderMap, extra: &HashMap<String, String>) -> HeaderMap {
    for (k, v) in extra {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(k.as_bytes()),
            HeaderValue::from_str(v),
        ) {
            base.insert(name, val);
        }
    }
    base
}

/// Convert a HeaderMap into a HashMap, dropping non-UTF-8 values.
pub fn headermap_to_hashmap(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect()
}

/// `watson-sdk-rust/<version> (os.arch=<arch>; os.name=<os>)`
pub fn user_agent() -> String {
    format!(
        "{SDK_NAME}/{SDK_VERSION} (os.arch={}; os.name={})",
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Analytics header sent with every generated operation.
pub fn sdk_headers(service_name: &str, service_version: &str, operation_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value =
        format!("service_name={service_name};service_version={service_version};operation_id={operation_id}");
    if let Ok(v) = HeaderValue::from_str(&value) {
        headers.insert(HeaderName::from_static("x-ibmcloud-sdk-analytics"), v);
    }
    headers
}
