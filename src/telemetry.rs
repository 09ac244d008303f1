//! Opt-in log output.
//!
//! The SDK only emits `tracing` events under the `watson_sdk` target; it
//! never installs a subscriber. Applications without their own subscriber
//! can call one of the `init_*` functions:
//!
//! ```rust,no_run
//! use watson_sdk::telemetry::{OutputFormat, SubscriberConfig, init_subscriber};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .directive("reqwest=info")
//!     .build();
//! init_subscriber(config)?;
//! # Ok::<(), watson_sdk::WatsonError>(())
//! ```

use crate::error::WatsonError;
use std::str::FromStr;

pub const LOG_LEVEL_ENV: &str = "WATSON_SDK_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "WATSON_SDK_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = WatsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(WatsonError::ConfigurationError(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    pub thread_ids: bool,
    /// Extra `EnvFilter` directives, e.g. `hyper=debug`.
    pub directives: Vec<String>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            thread_ids: false,
            directives: Vec::new(),
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Text output with request/response logging enabled.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// `EnvFilter` string for this config.
    pub fn filter(&self) -> String {
        let level = self.log_level.as_str().to_ascii_lowercase();
        std::iter::once(format!("watson_sdk={level}"))
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    thread_ids: Option<bool>,
    directives: Vec<String>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Parse `trace`, `debug`, `info`, `warn` or `error`.
    pub fn log_level_str(mut self, level: &str) -> Result<Self, WatsonError> {
        let parsed = tracing::Level::from_str(level.trim()).map_err(|_| {
            WatsonError::ConfigurationError(format!(
                "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
            ))
        })?;
        self.log_level = Some(parsed);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = Some(enabled);
        self
    }

    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            thread_ids: self.thread_ids.unwrap_or(false),
            directives: self.directives,
        }
    }
}

/// Install a global fmt subscriber. An already installed subscriber is
/// left in place and reported as success.
pub fn init_subscriber(config: SubscriberConfig) -> Result<(), WatsonError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    let filter = config.filter();
    let init_result = match config.output_format {
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .try_init(),
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .json()
            .flatten_event(true)
            .try_init(),
    };

    match init_result {
        Ok(()) => Ok(()),
        Err(e)
            if e.to_string().contains("already been set")
                || e.to_string().contains("already initialized") =>
        {
            Ok(())
        }
        Err(e) => Err(WatsonError::ConfigurationError(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}

pub fn init_default() -> Result<(), WatsonError> {
    init_subscriber(SubscriberConfig::default())
}

/// Configure from `WATSON_SDK_LOG_LEVEL` and `WATSON_SDK_LOG_FORMAT`.
pub fn init_from_env() -> Result<(), WatsonError> {
    init_subscriber(config_from_env()?)
}

fn config_from_env() -> Result<SubscriberConfig, WatsonError> {
    let mut builder = SubscriberConfig::builder();
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        builder = builder.output_format(format.parse()?);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_targets_the_sdk() {
        let config = SubscriberConfig::builder()
            .log_level(tracing::Level::DEBUG)
            .directive("reqwest=warn")
            .build();
        assert_eq!(config.filter(), "watson_sdk=debug,reqwest=warn");
        assert_eq!(SubscriberConfig::default().filter(), "watson_sdk=info");
    }

    #[test]
    fn parses_levels_and_formats() {
        let config = SubscriberConfig::builder()
            .log_level_str("WARN")
            .unwrap()
            .build();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert!(SubscriberConfig::builder().log_level_str("loud").is_err());

        assert_eq!(
            "json-compact".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonCompact
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
