//! Main client for the Capsule SDK.

use crate::api::{MilestonesApi, OpportunitiesApi, PartiesApi, TasksApi};
use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{CapsuleError, CapsuleResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the Capsule CRM v2 REST API.
#[derive(Clone)]
pub struct CapsuleClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl CapsuleClient {
    /// Create a new client builder.
    pub fn builder() -> CapsuleClientBuilder {
        CapsuleClientBuilder::new()
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> CapsuleResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> CapsuleResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the parties API.
    pub fn parties(&self) -> PartiesApi<'_> {
        PartiesApi::new(self)
    }

    /// Get the opportunities API.
    pub fn opportunities(&self) -> OpportunitiesApi<'_> {
        OpportunitiesApi::new(self)
    }

    /// Get the tasks API.
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    /// Get the milestones API.
    pub fn milestones(&self) -> MilestonesApi<'_> {
        MilestonesApi::new(self)
    }
}

/// Builder for creating a [`CapsuleClient`].
pub struct CapsuleClientBuilder {
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl CapsuleClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the base URL (tests point this at a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bearer token for authentication.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> CapsuleResult<CapsuleClient> {
        let access_token = self
            .access_token
            .ok_or_else(|| CapsuleError::Config("access_token is required".to_string()))?;
        let base_url = Url::parse(&self.base_url)?;

        CapsuleClient::from_config(ClientConfig {
            base_url,
            access_token,
            timeout: self.timeout,
        })
    }
}

impl Default for CapsuleClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_access_token() {
        let result = CapsuleClient::builder().build();
        assert!(matches!(result, Err(CapsuleError::Config(_))));
    }

    #[test]
    fn builder_defaults_to_production_base_url() {
        let client = CapsuleClient::builder()
            .access_token("token-123")
            .build()
            .unwrap();
        assert_eq!(client.config().base_url.as_str(), DEFAULT_BASE_URL);
    }
}
