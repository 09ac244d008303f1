//! watson-sdk
//!
//! Request dispatch core for the IBM Watson REST services and an Ogg/Opus
//! container writer for streaming audio uploads.
//!
//! ```rust,ignore
//! use watson_sdk::prelude::*;
//!
//! let tts = TextToSpeech::from_builder(TextToSpeech::builder().iam_api_key("my-api-key"))?;
//! let voices = tts.list_voices().execute().await?;
//! ```
#![deny(unsafe_code)]

pub mod audio;
pub mod auth;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod service;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use error::WatsonError;

/// Commonly used types.
pub mod prelude {
    pub use crate::audio::{AudioConsumer, OpusWriter, OpusWriterConfig};
    pub use crate::auth::{Authenticator, IamOptions, IamTokenManager, TokenProvider};
    pub use crate::config::ServiceCredentials;
    pub use crate::error::{ErrorCategory, WatsonError};
    pub use crate::http::config::HttpConfig;
    pub use crate::http::request::{HttpMethod, RequestBuilder};
    pub use crate::http::response::Response;
    pub use crate::service::{ServiceBuilder, ServiceCall, ServiceCallback, WatsonService};
    pub use crate::services::{NaturalLanguageClassifier, SpeechToText, TextToSpeech};
}
