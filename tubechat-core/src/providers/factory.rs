//! Client factory
//!
//! A fresh [`LlmClient`] is built for every request: the key comes from the
//! request context, so nothing is cached between requests.

use super::openai::LlmClient;
use super::vendor::VendorRegistry;
use crate::config::{BridgeConfig, ConfigError, ConnectionConfig, SecretString};
use crate::error::{BridgeError, BridgeResult};
use reqwest::ClientBuilder;
use std::time::Duration;
use tracing::debug;

/// Builds per-request clients from the vendor table and connection settings
#[derive(Debug, Clone, Default)]
pub struct ClientFactory {
    registry: VendorRegistry,
    connection: ConnectionConfig,
}

impl ClientFactory {
    /// Create a factory from a configuration, validating it first
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            registry: VendorRegistry::from_config(config)?,
            connection: config.connection.clone(),
        })
    }

    /// Build a client for `model` authenticated with `api_key`.
    ///
    /// The key is trimmed; an empty or whitespace-only key is rejected.
    pub fn create_client(
        &self,
        api_key: &SecretString,
        model: Option<&str>,
    ) -> BridgeResult<LlmClient> {
        if api_key.is_blank() {
            return Err(BridgeError::Configuration(
                "API key is required. Please add your API key in the extension settings."
                    .to_string(),
            ));
        }

        let target = self.registry.resolve(model);
        debug!(
            "Creating client for vendor {} at {} (key: {})",
            target.vendor.name,
            target.vendor.base_url,
            api_key.partial_redact()
        );

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(self.connection.connect_timeout_secs))
            .pool_max_idle_per_host(self.connection.pool_max_idle_per_host)
            .user_agent(self.connection.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|e| {
                BridgeError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(LlmClient::new(http, api_key.trimmed(), target))
    }
}
