//! Service configuration sources.

pub mod credentials;

pub use credentials::{ServiceCredentials, credential_file_candidates};
