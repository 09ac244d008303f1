//! Status mapping, message extraction, and accessors.

use super::types::{ErrorCategory, ErrorResponse, WatsonError};
use reqwest::header::HeaderMap;

/// Body fields checked, in order, for a human-readable error message.
pub const ERROR_MESSAGE_FIELDS: [&str; 3] = ["error", "error_message", "message"];

const UNAUTHORIZED_MESSAGE: &str =
    "Unauthorized: Access is denied due to invalid credentials. Tip: Did you set the Endpoint?";

/// Extract the error message from a response body.
///
/// The first of `error`, `error_message`, `message` present on a JSON object
/// wins. Anything else (non-JSON body, non-string field) yields the raw body.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(value) = ERROR_MESSAGE_FIELDS.iter().find_map(|k| map.get(*k))
    {
        return match value {
            serde_json::Value::String(s) => s.clone(),
            _ => body.to_string(),
        };
    }
    body.to_string()
}

/// Default message for a mapped status when the body carries none.
pub fn default_status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad Request"),
        401 => Some(UNAUTHORIZED_MESSAGE),
        403 | 406 => Some("Forbidden: Service refuse the request"),
        404 => Some("Not found"),
        409 => Some(""),
        413 => Some(
            "Request too large: The request entity is larger than the server is able to process",
        ),
        415 => Some("Unsupported Media Type"),
        429 => Some("Too many requests"),
        500 => Some("Internal Server Error"),
        503 => Some("Service Unavailable"),
        _ => None,
    }
}

impl WatsonError {
    /// Map a non-2xx response to its typed error.
    pub fn from_response(
        status: u16,
        message: impl Into<String>,
        headers: HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if status == 401 {
            message = UNAUTHORIZED_MESSAGE.to_string();
        } else if message.is_empty()
            && let Some(default) = default_status_message(status)
        {
            message = default.to_string();
        }
        let response = ErrorResponse {
            status,
            message,
            headers,
            body: body.into(),
        };
        match status {
            400 => Self::BadRequest(response),
            401 => Self::Unauthorized(response),
            403 | 406 => Self::Forbidden(response),
            404 => Self::NotFound(response),
            409 => Self::Conflict(response),
            413 => Self::RequestTooLarge(response),
            415 => Self::UnsupportedMediaType(response),
            429 => Self::TooManyRequests(response),
            500 => Self::InternalServerError(response),
            503 => Self::ServiceUnavailable(response),
            _ => Self::ServiceResponse(response),
        }
    }

    /// Map a status and raw body, extracting the message from the body.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_error_message(&body);
        Self::from_response(status, message, HeaderMap::new(), body)
    }

    /// The response details for status errors.
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::BadRequest(r)
            | Self::Unauthorized(r)
            | Self::Forbidden(r)
            | Self::NotFound(r)
            | Self::Conflict(r)
            | Self::RequestTooLarge(r)
            | Self::UnsupportedMediaType(r)
            | Self::TooManyRequests(r)
            | Self::InternalServerError(r)
            | Self::ServiceUnavailable(r)
            | Self::ServiceResponse(r) => Some(r),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.error_response().map(|r| r.status)
    }

    /// The bare message, without the variant prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigurationError(m)
            | Self::MissingCredentials(m)
            | Self::InvalidParameter(m)
            | Self::HttpError(m)
            | Self::IoError(m)
            | Self::ParseError(m)
            | Self::JsonError(m)
            | Self::Cancelled(m) => m,
            other => other
                .error_response()
                .map(|r| r.message.as_str())
                .unwrap_or_default(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) | Self::MissingCredentials(_) | Self::InvalidParameter(_) => {
                ErrorCategory::Configuration
            }
            Self::HttpError(_) | Self::IoError(_) | Self::Cancelled(_) => ErrorCategory::Network,
            Self::ParseError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
            other => match other.status_code() {
                Some(code) if code >= 500 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }
}
