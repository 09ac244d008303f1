//! Conversions from foreign error types.

use super::types::WatsonError;

impl From<reqwest::Error> for WatsonError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if err.is_builder() {
            Self::ConfigurationError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WatsonError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for WatsonError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for WatsonError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Cancelled(err.to_string())
    }
}
