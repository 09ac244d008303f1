//! HTTP Interceptor interfaces
//!
//! Interceptors observe and tweak the prepared request before it is sent,
//! observe response status and headers, and are notified of errors. The
//! hooks are best-effort and should avoid expensive work.

use crate::error::WatsonError;
use crate::http::request::HttpMethod;
use crate::http::transport::HttpRequest;
use reqwest::header::HeaderMap;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub request_id: String,
    pub service_name: String,
    pub method: HttpMethod,
    pub url: String,
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called after authentication, right before the transport sends.
    /// Returning an error short-circuits the call.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        _request: &mut HttpRequest,
    ) -> Result<(), WatsonError> {
        Ok(())
    }

    /// Called once the response status and headers are known.
    fn on_response(
        &self,
        _ctx: &HttpRequestContext,
        _status: u16,
        _headers: &HeaderMap,
    ) -> Result<(), WatsonError> {
        Ok(())
    }

    /// Called when sending fails or the status maps to an error.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &WatsonError) {}
}

/// A simple logging interceptor backed by `tracing` (no credentials).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        _request: &mut HttpRequest,
    ) -> Result<(), WatsonError> {
        tracing::debug!(target: "watson_sdk::http", request_id=%ctx.request_id, service=%ctx.service_name, method=%ctx.method, url=%ctx.url, "sending request");
        Ok(())
    }

    fn on_response(
        &self,
        ctx: &HttpRequestContext,
        status: u16,
        _headers: &HeaderMap,
    ) -> Result<(), WatsonError> {
        tracing::debug!(target: "watson_sdk::http", request_id=%ctx.request_id, service=%ctx.service_name, url=%ctx.url, status=%status, "response received");
        Ok(())
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &WatsonError) {
        tracing::debug!(target: "watson_sdk::http", request_id=%ctx.request_id, service=%ctx.service_name, url=%ctx.url, err=%error, "request error");
    }
}
