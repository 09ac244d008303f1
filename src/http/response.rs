//! Response conversion.
//!
//! A [`ResponseConverter`] turns a successful response body into the typed
//! result of an operation. Non-2xx responses never reach a converter.

use crate::error::WatsonError;
use crate::http::transport::{ByteStream, ResponseBody};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// A converted result together with the response status and headers.
#[derive(Debug, Clone)]
pub struct Response<T> {
    result: T,
    status: u16,
    headers: HeaderMap,
}

impl<T> Response<T> {
    pub fn new(result: T, status: u16, headers: HeaderMap) -> Self {
        Self {
            result,
            status,
            headers,
        }
    }

    pub fn result(&self) -> &T {
        &self.result
    }

    pub fn into_result(self) -> T {
        self.result
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            result: f(self.result),
            status: self.status,
            headers: self.headers,
        }
    }
}

/// Converts a successful response body.
#[async_trait]
pub trait ResponseConverter: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn convert(&self, body: ResponseBody) -> Result<Self::Output, WatsonError>;
}

/// Deserializes a JSON object.
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> ResponseConverter for JsonConverter<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    async fn convert(&self, body: ResponseBody) -> Result<T, WatsonError> {
        let bytes = body.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| WatsonError::ParseError(format!("Failed to parse response body: {e}")))
    }
}

/// Deserializes a JSON array wrapped in a named field of the response
/// object, e.g. `{"voices": [...]}`. A missing field yields an empty list.
pub struct JsonListConverter<T> {
    field: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonListConverter<T> {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> ResponseConverter for JsonListConverter<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Vec<T>;

    async fn convert(&self, body: ResponseBody) -> Result<Vec<T>, WatsonError> {
        let bytes = body.bytes().await?;
        let mut value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| WatsonError::ParseError(format!("Failed to parse response body: {e}")))?;
        match value.get_mut(&self.field).map(serde_json::Value::take) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items).map_err(|e| {
                WatsonError::ParseError(format!("Invalid '{}' array: {e}", self.field))
            }),
        }
    }
}

/// Returns the body as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

#[async_trait]
impl ResponseConverter for StringConverter {
    type Output = String;

    async fn convert(&self, body: ResponseBody) -> Result<String, WatsonError> {
        body.text().await
    }
}

/// Returns the buffered body bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesConverter;

#[async_trait]
impl ResponseConverter for BytesConverter {
    type Output = Bytes;

    async fn convert(&self, body: ResponseBody) -> Result<Bytes, WatsonError> {
        body.bytes().await
    }
}

/// Hands the body over as a stream without buffering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamConverter;

#[async_trait]
impl ResponseConverter for StreamConverter {
    type Output = ByteStream;

    async fn convert(&self, body: ResponseBody) -> Result<ByteStream, WatsonError> {
        Ok(body.into_stream())
    }
}

/// Discards the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidConverter;

#[async_trait]
impl ResponseConverter for VoidConverter {
    type Output = ();

    async fn convert(&self, _body: ResponseBody) -> Result<(), WatsonError> {
        Ok(())
    }
}
