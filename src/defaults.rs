//! Default values shared across the crate.

/// HTTP client defaults.
pub mod http {
    use std::time::Duration;

    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// IAM token service defaults.
pub mod iam {
    pub const DEFAULT_URL: &str = "https://iam.ng.bluemix.net/identity/token";
    /// Client credentials sent with every token request (`bx:bx`).
    pub const CLIENT_AUTHORIZATION: &str = "Basic Yng6Yng=";
    pub const GRANT_TYPE_API_KEY: &str = "urn:ibm:params:oauth:grant-type:apikey";
    pub const GRANT_TYPE_REFRESH: &str = "refresh_token";
    pub const RESPONSE_TYPE: &str = "cloud_iam";
    /// Share of the token lifetime after which a managed token is refreshed.
    pub const REFRESH_FRACTION: f64 = 0.8;
}

/// Credential discovery defaults.
pub mod credentials {
    pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";
    pub const CREDENTIAL_FILE_NAME: &str = "ibm-credentials.env";
    /// Username that turns a basic-auth pair into an IAM api key.
    pub const APIKEY_AS_USERNAME: &str = "apikey";
    /// Password prefix for IBM Cloud Private keys, which stay on basic auth.
    pub const ICP_PREFIX: &str = "icp-";
}

/// Ogg/Opus writer defaults.
pub mod audio {
    pub const SAMPLE_RATE: u32 = 16_000;
    pub const FRAME_SIZE: u32 = 160;
    pub const PACKETS_PER_OGG_PAGE: usize = 50;
    pub const VENDOR: &str = "IBM";
}

pub const SDK_NAME: &str = "watson-sdk-rust";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
