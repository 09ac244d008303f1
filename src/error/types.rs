//! Core error types.

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Details of a non-2xx response, kept on every status error.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Message extracted from the body, or the status default.
    pub message: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: String,
}

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid or missing configuration. Never recoverable by retrying.
    Configuration,
    /// 4xx responses.
    Client,
    /// 5xx responses.
    Server,
    /// Transport failures.
    Network,
    /// Response decoding failures.
    Parsing,
}

/// Error type for every Watson operation.
#[derive(Error, Debug, Clone)]
pub enum WatsonError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Call cancelled: {0}")]
    Cancelled(String),

    /// HTTP 400
    #[error("Bad request ({}): {}", .0.status, .0.message)]
    BadRequest(ErrorResponse),

    /// HTTP 401
    #[error("Unauthorized ({}): {}", .0.status, .0.message)]
    Unauthorized(ErrorResponse),

    /// HTTP 403 and 406
    #[error("Forbidden ({}): {}", .0.status, .0.message)]
    Forbidden(ErrorResponse),

    /// HTTP 404
    #[error("Not found ({}): {}", .0.status, .0.message)]
    NotFound(ErrorResponse),

    /// HTTP 409
    #[error("Conflict ({}): {}", .0.status, .0.message)]
    Conflict(ErrorResponse),

    /// HTTP 413
    #[error("Request too large ({}): {}", .0.status, .0.message)]
    RequestTooLarge(ErrorResponse),

    /// HTTP 415
    #[error("Unsupported media type ({}): {}", .0.status, .0.message)]
    UnsupportedMediaType(ErrorResponse),

    /// HTTP 429
    #[error("Too many requests ({}): {}", .0.status, .0.message)]
    TooManyRequests(ErrorResponse),

    /// HTTP 500
    #[error("Internal server error ({}): {}", .0.status, .0.message)]
    InternalServerError(ErrorResponse),

    /// HTTP 503
    #[error("Service unavailable ({}): {}", .0.status, .0.message)]
    ServiceUnavailable(ErrorResponse),

    /// Any other non-2xx status.
    #[error("Service error ({}): {}", .0.status, .0.message)]
    ServiceResponse(ErrorResponse),
}

static_assertions::assert_impl_all!(WatsonError: Send, Sync);
