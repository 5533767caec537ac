//! Configuration schema structures with serde support

use serde::{Deserialize, Serialize};

/// Default OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Endpoint serving the Qwen model family
pub const QWEN_BASE_URL: &str = "https://apis.iflow.cn/v1";

/// Root configuration structure for the bridge
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Vendors the bridge can route to
    #[serde(default = "default_vendors")]
    pub vendors: Vec<VendorConfig>,

    /// Connection settings shared by every outbound client
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            vendors: default_vendors(),
            connection: ConnectionConfig::default(),
        }
    }
}

/// Capability record for one LLM vendor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VendorConfig {
    /// Unique vendor name
    pub name: String,

    /// Case-sensitive model id prefix routed to this vendor.
    /// Exactly one vendor leaves this unset and acts as the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_prefix: Option<String>,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model used when the request names none
    pub default_model: String,

    /// Whether responses are relayed as a token stream
    #[serde(default = "default_true")]
    pub streaming: bool,
}

impl VendorConfig {
    /// The built-in OpenAI vendor (default route, streaming)
    pub fn openai() -> Self {
        Self {
            name: "openai".to_string(),
            model_prefix: None,
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: "gpt-4o-mini".to_string(),
            streaming: true,
        }
    }

    /// The built-in Qwen vendor (prefix `qwen`, non-streaming)
    pub fn qwen() -> Self {
        Self {
            name: "qwen".to_string(),
            model_prefix: Some("qwen".to_string()),
            base_url: QWEN_BASE_URL.to_string(),
            default_model: "qwen-plus".to_string(),
            streaming: false,
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// TCP connect timeout in seconds. No overall request timeout is applied,
    /// streamed responses may run for as long as the upstream keeps sending.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum idle connections kept per host
    #[serde(default = "default_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            pool_max_idle_per_host: default_max_idle(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_vendors() -> Vec<VendorConfig> {
    vec![VendorConfig::openai(), VendorConfig::qwen()]
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_idle() -> usize {
    10
}

fn default_user_agent() -> String {
    concat!("tubechat/", env!("CARGO_PKG_VERSION")).to_string()
}
