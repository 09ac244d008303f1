//! Credential discovery.
//!
//! Credentials are read from the Cloud Foundry `VCAP_SERVICES` document and
//! from an `ibm-credentials.env` file. Nothing is cached process-wide; the
//! resulting [`ServiceCredentials`] is handed to a service builder.

use crate::auth::{Authenticator, IamOptions};
use crate::defaults::credentials::{CREDENTIAL_FILE_NAME, VCAP_SERVICES_ENV};
use crate::error::WatsonError;
use crate::http::transport::HttpTransport;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Credential fields understood by every service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Legacy api key, sent as basic credentials.
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub iam_api_key: Option<String>,
    pub iam_url: Option<String>,
}

impl ServiceCredentials {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields set on `other` replace those on `self`.
    pub fn merge(mut self, other: ServiceCredentials) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(username, password, api_key, url, iam_api_key, iam_url);
        self
    }

    /// Credentials of the first `VCAP_SERVICES` instance whose key starts
    /// with `service_name` and whose plan matches (any plan when `None`).
    pub fn from_vcap(service_name: &str, vcap_services: &str, plan: Option<&str>) -> Self {
        if service_name.is_empty() {
            return Self::default();
        }
        let services: Value = match serde_json::from_str(vcap_services) {
            Ok(v) => v,
            Err(e) => {
                tracing::info!(target: "watson_sdk::config", err=%e, "Error parsing VCAP_SERVICES");
                return Self::default();
            }
        };
        let Some(credentials) = find_vcap_credentials(&services, service_name, plan) else {
            return Self::default();
        };
        let field = |key: &str| credentials.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            username: field("username"),
            password: field("password"),
            api_key: field("api_key"),
            url: field("url"),
            iam_api_key: field("apikey"),
            iam_url: field("iam_url"),
        }
    }

    /// Parse `KEY=value` lines such as `TEXT_TO_SPEECH_APIKEY=...`.
    ///
    /// Keys are matched case-insensitively against `service_name`; the part
    /// after the name and one separator selects the field.
    pub fn from_credential_file_contents(service_name: &str, contents: &str) -> Self {
        let mut creds = Self::default();
        if service_name.is_empty() {
            return creds;
        }
        let service_name = service_name.to_lowercase();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let Some(pos) = key.find(&service_name) else {
                continue;
            };
            let credential_type = key.get(pos + service_name.len() + 1..).unwrap_or_default();
            let value = Some(value.trim().to_string());
            match credential_type {
                "username" => creds.username = value,
                "password" => creds.password = value,
                "api_key" => creds.api_key = value,
                "url" => creds.url = value,
                "apikey" => creds.iam_api_key = value,
                "iam_url" => creds.iam_url = value,
                other => {
                    tracing::warn!(target: "watson_sdk::config", key=%other, "Unknown credential key found in credential file")
                }
            }
        }
        creds
    }

    pub fn from_credential_file(service_name: &str, path: &Path) -> Result<Self, WatsonError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WatsonError::ConfigurationError(format!(
                "Failed to read credential file {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::from_credential_file_contents(service_name, &contents))
    }

    /// `VCAP_SERVICES` first, then the first credential file found in
    /// [`credential_file_candidates`]; file values win.
    pub fn from_environment(service_name: &str) -> Self {
        let mut creds = std::env::var(VCAP_SERVICES_ENV)
            .map(|vcap| Self::from_vcap(service_name, &vcap, None))
            .unwrap_or_default();

        if let Some(path) = credential_file_candidates().into_iter().find(|p| p.is_file()) {
            match Self::from_credential_file(service_name, &path) {
                Ok(file) => creds = creds.merge(file),
                Err(e) => tracing::error!(target: "watson_sdk::config", err=%e, "There was a problem trying to read the credential file"),
            }
        }
        creds
    }

    /// Authenticator for these credentials: an IAM api key wins over a
    /// username/password pair, which wins over a legacy api key.
    pub fn authenticator(
        &self,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Option<Authenticator>, WatsonError> {
        if let Some(key) = &self.iam_api_key {
            let mut options = IamOptions::new().api_key(key);
            if let Some(url) = &self.iam_url {
                options = options.url(url);
            }
            return Authenticator::iam(options, transport).map(Some);
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return Authenticator::username_password(username, password, transport).map(Some);
        }
        if let Some(key) = &self.api_key {
            return Authenticator::api_key(key).map(Some);
        }
        Ok(None)
    }
}

fn find_vcap_credentials<'a>(
    services: &'a Value,
    service_name: &str,
    plan: Option<&str>,
) -> Option<&'a Value> {
    services
        .as_object()?
        .iter()
        .filter(|(key, _)| key.starts_with(service_name))
        .filter_map(|(_, instances)| instances.as_array())
        .flatten()
        .find(|instance| match plan {
            None => true,
            Some(plan) => instance
                .get("plan")
                .and_then(Value::as_str)
                .is_some_and(|p| p.eq_ignore_ascii_case(plan)),
        })
        .and_then(|instance| instance.get("credentials"))
}

/// Locations searched for the credential file, in order: `$HOME`,
/// `$HOMEDRIVE$HOMEPATH`, `$USERPROFILE`, the working directory.
pub fn credential_file_candidates() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home));
    }
    if let (Ok(drive), Ok(path)) = (std::env::var("HOMEDRIVE"), std::env::var("HOMEPATH")) {
        dirs.push(PathBuf::from(format!("{drive}{path}")));
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        dirs.push(PathBuf::from(profile));
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs.into_iter().map(|d| d.join(CREDENTIAL_FILE_NAME)).collect()
}
