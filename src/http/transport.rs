//! HTTP transport abstraction.
//!
//! The dispatch core talks to the network only through [`HttpTransport`], so
//! a fake backend can observe the final URL, headers and body and answer
//! without going through `reqwest`.

use crate::error::WatsonError;
use crate::http::config::HttpConfig;
use crate::http::request::{HttpMethod, RequestBody};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use std::fmt;

/// A stream of body chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, WatsonError>>;

/// A fully prepared request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute once the service has resolved it against its endpoint.
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Response body, either already buffered or still streaming.
pub enum ResponseBody {
    Buffered(Bytes),
    Streaming(ByteStream),
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self::Buffered(Bytes::new())
    }

    /// Collect the whole body.
    pub async fn bytes(self) -> Result<Bytes, WatsonError> {
        match self {
            Self::Buffered(b) => Ok(b),
            Self::Streaming(mut s) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = s.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    /// Collect the whole body as UTF-8 text, replacing invalid sequences.
    pub async fn text(self) -> Result<String, WatsonError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn into_stream(self) -> ByteStream {
        match self {
            Self::Buffered(b) => stream::once(async move { Ok(b) }).boxed(),
            Self::Streaming(s) => s,
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(b) => f.debug_tuple("Buffered").field(&b.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

/// Transport-level response data.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one prepared request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WatsonError>;
}

/// Default transport backed by `reqwest`. The body is streamed, not buffered.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, WatsonError> {
        Ok(Self::new(config.build_client()?))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WatsonError> {
        let HttpRequest {
            method,
            url,
            mut headers,
            body,
        } = request;

        if matches!(body, RequestBody::Multipart(_)) {
            headers.remove(CONTENT_TYPE);
        }
        let mut builder = self.client.request(method.into(), &url).headers(headers);
        builder = match body {
            RequestBody::Empty if method.requires_body() => {
                builder.header(CONTENT_LENGTH, "0").body(Vec::<u8>::new())
            }
            RequestBody::Empty => builder,
            RequestBody::Bytes { data, .. } => builder.body(data),
            RequestBody::Multipart(form) => builder.multipart(form.into_form()?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| WatsonError::HttpError(format!("{method} {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(WatsonError::from).boxed();

        Ok(HttpResponse {
            status,
            headers,
            body: ResponseBody::Streaming(stream),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestBuilder;

    #[tokio::test]
    async fn reqwest_transport_sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/classify")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/json")
            .match_body(r#"{"text":"hi"}"#)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"top_class":"greeting"}"#)
            .create_async()
            .await;

        let mut request = RequestBuilder::post("/v1/classify")
            .body_json(&serde_json::json!({"text": "hi"}))
            .build()
            .unwrap();
        request.url = format!("{}{}", server.url(), request.url);

        let transport = ReqwestTransport::new(reqwest::Client::new());
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.text().await.unwrap(), r#"{"top_class":"greeting"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_post_sends_zero_length_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/empty")
            .match_header("content-length", "0")
            .with_status(204)
            .create_async()
            .await;

        let mut request = RequestBuilder::post("/v1/empty").build().unwrap();
        request.url = format!("{}{}", server.url(), request.url);
        let response = ReqwestTransport::new(reqwest::Client::new())
            .send(request)
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn buffered_body_streams_as_one_chunk() {
        let body = ResponseBody::from(Bytes::from_static(b"abc"));
        let chunks: Vec<_> = body.into_stream().collect().await;
        assert_eq!(chunks.len(), 1);
    }
}
