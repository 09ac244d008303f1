//! Request builder.
//!
//! Accumulates method, URL, query parameters, headers and body for one
//! logical operation and validates the combination in [`RequestBuilder::build`].

use crate::error::WatsonError;
use crate::http::headers::{header_name, header_value};
use crate::http::media_type::{
    APPLICATION_FORM_URLENCODED, APPLICATION_JSON, TEXT_PLAIN, is_json_mime_type,
    is_json_patch_mime_type,
};
use crate::http::transport::HttpRequest;
use crate::utils::mime::guess_mime;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fmt;

/// HTTP methods used by the Watson APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Methods that must not carry a request body.
    pub fn forbids_body(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    /// Methods that always send a (possibly empty) body.
    pub fn requires_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }
}

/// One part of a multipart/form-data body.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A cloneable multipart/form-data body, converted to a
/// `reqwest::multipart::Form` when the request is sent.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            filename: None,
            content_type: Some(TEXT_PLAIN.to_string()),
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Add a JSON field.
    pub fn json(mut self, name: impl Into<String>, value: &serde_json::Value) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            filename: None,
            content_type: Some(APPLICATION_JSON.to_string()),
            data: Bytes::from(value.to_string()),
        });
        self
    }

    /// Add a file field. Without an explicit content type one is guessed
    /// from the bytes, then from the filename.
    pub fn file(
        mut self,
        name: impl Into<String>,
        data: impl Into<Bytes>,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        let data = data.into();
        let content_type =
            content_type.or_else(|| Some(guess_mime(Some(&data), filename.as_deref())));
        self.parts.push(FormPart {
            name: name.into(),
            filename,
            content_type,
            data,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_form(self) -> Result<reqwest::multipart::Form, WatsonError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            let mut p = reqwest::multipart::Part::bytes(part.data.to_vec());
            if let Some(filename) = part.filename {
                p = p.file_name(filename);
            }
            if let Some(content_type) = part.content_type {
                p = p.mime_str(&content_type).map_err(|e| {
                    WatsonError::InvalidParameter(format!(
                        "Invalid content type '{content_type}' for part '{}': {e}",
                        part.name
                    ))
                })?;
            }
            form = form.part(part.name, p);
        }
        Ok(form)
    }
}

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes {
        data: Bytes,
        content_type: String,
    },
    Multipart(MultipartBody),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Bytes { content_type, .. } => Some(content_type),
            _ => None,
        }
    }
}

/// Builder for one outgoing request.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: String,
    query: Vec<(String, Option<String>)>,
    headers: Vec<(String, String)>,
    form: Vec<(String, Option<String>)>,
    body: Option<RequestBody>,
}

impl RequestBuilder {
    /// `url` is either absolute or a path relative to the service endpoint.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            form: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), Some(value.to_string())));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// A bare query flag without a value (`?name`).
    pub fn query_flag(mut self, name: impl Into<String>) -> Self {
        self.query.push((name.into(), None));
        self
    }

    /// Comma-joined list value, skipped when empty.
    pub fn query_list<V: AsRef<str>>(self, name: impl Into<String>, values: &[V]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.query(name, joined)
    }

    /// One query parameter per value.
    pub fn query_all<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let name = name.into();
        for v in values {
            self.query.push((name.clone(), Some(v.to_string())));
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for (k, v) in headers {
            if let Ok(v) = v.to_str() {
                self.headers.push((k.as_str().to_string(), v.to_string()));
            }
        }
        self
    }

    /// Add a urlencoded form field. Form fields replace any other body.
    pub fn form(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.form.push((name.into(), Some(value.to_string())));
        self
    }

    pub fn form_opt<V: ToString>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.form.push((name.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn body_json(self, value: &serde_json::Value) -> Self {
        self.body_json_with_type(value, APPLICATION_JSON)
    }

    pub fn body_json_with_type(mut self, value: &serde_json::Value, content_type: &str) -> Self {
        self.body = Some(RequestBody::Bytes {
            data: Bytes::from(value.to_string()),
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn body_text(mut self, text: impl Into<String>, content_type: &str) -> Self {
        self.body = Some(RequestBody::Bytes {
            data: Bytes::from(text.into()),
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn body_bytes(mut self, data: impl Into<Bytes>, content_type: &str) -> Self {
        self.body = Some(RequestBody::Bytes {
            data: data.into(),
            content_type: content_type.to_string(),
        });
        self
    }

    pub fn body_multipart(mut self, body: MultipartBody) -> Self {
        self.body = Some(RequestBody::Multipart(body));
        self
    }

    /// Pick the body source matching `content_type`: `json` for JSON and
    /// merge-patch types, `json_patch` for JSON-patch, `non_json` otherwise.
    /// The body is left unset when the selected source is absent.
    pub fn body_content(
        self,
        content_type: &str,
        json: Option<&serde_json::Value>,
        json_patch: Option<&serde_json::Value>,
        non_json: Option<Bytes>,
    ) -> Self {
        if is_json_mime_type(content_type) {
            match json {
                Some(v) => self.body_json_with_type(v, content_type),
                None => self,
            }
        } else if is_json_patch_mime_type(content_type) {
            match json_patch {
                Some(v) => self.body_json_with_type(v, content_type),
                None => self,
            }
        } else {
            match non_json {
                Some(data) => self.body_bytes(data, content_type),
                None => self,
            }
        }
    }

    /// Validate and produce the request.
    ///
    /// `Accept: application/json` is the default; explicit headers override it.
    pub fn build(self) -> Result<HttpRequest, WatsonError> {
        let body = if self.form.is_empty() {
            self.body.unwrap_or_default()
        } else {
            RequestBody::Bytes {
                data: Bytes::from(encode_pairs(&self.form, true)),
                content_type: APPLICATION_FORM_URLENCODED.to_string(),
            }
        };

        if self.method.forbids_body() && !body.is_empty() {
            return Err(WatsonError::InvalidParameter(format!(
                "{} requests must not have a body",
                self.method
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if let Some(content_type) = body.content_type() {
            headers.insert(CONTENT_TYPE, header_value(content_type)?);
        }
        for (name, value) in &self.headers {
            headers.insert(header_name(name)?, header_value(value)?);
        }
        if matches!(body, RequestBody::Multipart(_)) {
            headers.remove(CONTENT_TYPE);
        }

        let mut url = self.url;
        if !self.query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode_pairs(&self.query, false));
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

fn encode_pairs(pairs: &[(String, Option<String>)], empty_for_none: bool) -> String {
    pairs
        .iter()
        .map(|(k, v)| match v {
            Some(v) => format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)),
            None if empty_for_none => format!("{}=", urlencoding::encode(k)),
            None => urlencoding::encode(k).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Join `endpoint` with path segments, inserting the percent-encoded path
/// parameter that follows each segment.
///
/// `construct_http_url("https://h/api", &["v1/classifiers", "classify"], &["abc"])`
/// yields `https://h/api/v1/classifiers/abc/classify`.
pub fn construct_http_url(endpoint: &str, segments: &[&str], params: &[&str]) -> String {
    let mut url = endpoint.trim_end_matches('/').to_string();
    for (i, segment) in segments.iter().enumerate() {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
        if let Some(param) = params.get(i) {
            url.push('/');
            url.push_str(&urlencoding::encode(param));
        }
    }
    url
}

/// Expand `{name}` placeholders in `template` with percent-encoded values
/// and append the result to `service_url`.
pub fn resolve_request_url(
    service_url: &str,
    template: &str,
    path_params: &[(&str, &str)],
) -> Result<String, WatsonError> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            return Err(WatsonError::InvalidParameter(format!(
                "Unterminated path parameter in '{template}'"
            )));
        };
        let name = &rest[start + 1..start + len];
        let value = path_params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| {
                WatsonError::InvalidParameter(format!("Missing path parameter '{name}'"))
            })?;
        if value.is_empty() {
            return Err(WatsonError::InvalidParameter(format!(
                "Path parameter '{name}' must not be empty"
            )));
        }
        path.push_str(&rest[..start]);
        path.push_str(&urlencoding::encode(value));
        rest = &rest[start + len + 1..];
    }
    path.push_str(rest);

    let base = service_url.trim_end_matches('/');
    if path.is_empty() {
        Ok(base.to_string())
    } else if path.starts_with('/') {
        Ok(format!("{base}{path}"))
    } else {
        Ok(format!("{base}/{path}"))
    }
}
