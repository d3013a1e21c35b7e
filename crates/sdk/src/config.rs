//! Configuration for the Capsule client.

use std::time::Duration;
use url::Url;

use crate::error::{CapsuleError, CapsuleResult};

/// Environment variable holding the Capsule API bearer token.
pub const ACCESS_TOKEN_ENV: &str = "CAPSULECRM_ACCESS_TOKEN";

/// Base URL of the Capsule CRM v2 API.
pub const DEFAULT_BASE_URL: &str = "https://api.capsulecrm.com/api/v2";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Capsule client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, including the API version prefix.
    pub base_url: Url,
    /// Bearer token for authentication.
    pub access_token: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the production API with the given token.
    pub fn new(access_token: impl Into<String>) -> CapsuleResult<Self> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read configuration from the environment. A missing or empty access
    /// token is an error; the server binary treats it as fatal at startup.
    pub fn from_env() -> CapsuleResult<Self> {
        let access_token = std::env::var(ACCESS_TOKEN_ENV).map_err(|_| {
            CapsuleError::Config(format!("{ACCESS_TOKEN_ENV} environment variable not set"))
        })?;
        if access_token.is_empty() {
            return Err(CapsuleError::Config(format!(
                "{ACCESS_TOKEN_ENV} environment variable is empty"
            )));
        }
        Self::new(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_production_defaults() {
        let config = ClientConfig::new("token-123").unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.access_token, "token-123");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
