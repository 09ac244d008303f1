//! Error Handling Module
//!
//! This module provides the error type returned by every fallible operation:
//! - Core error types (`WatsonError`, `ErrorResponse`, `ErrorCategory`)
//! - Status mapping and error-message extraction helpers
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use watson_sdk::error::{ErrorCategory, WatsonError};
//!
//! let error = WatsonError::from_status(404, r#"{"error":"not found"}"#);
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert_eq!(error.message(), "not found");
//! ```

mod conversions;
pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
