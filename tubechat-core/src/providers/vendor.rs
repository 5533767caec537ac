//! Vendor capability records and model routing
//!
//! Every model id the UI sends is resolved here, once per request: the vendor
//! whose `model_prefix` matches (case-sensitive) wins, the longest prefix when
//! several match, and the vendor without a prefix catches the rest.

use crate::config::{BridgeConfig, ConfigValidator, ValidationError, VendorConfig};

/// How the completion is fetched and relayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// One request, whole answer relayed as a single frame
    Standard,
    /// Server-sent events relayed delta by delta
    Stream,
}

/// A model id paired with the vendor that serves it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    /// Capability record of the serving vendor
    pub vendor: VendorConfig,
    /// Model id sent upstream (the vendor default when the request named none)
    pub model: String,
}

impl ResolvedModel {
    /// Call mode implied by the vendor's streaming support
    pub fn call_mode(&self) -> CallMode {
        if self.vendor.streaming {
            CallMode::Stream
        } else {
            CallMode::Standard
        }
    }
}

/// Lookup table over the configured vendors
#[derive(Debug, Clone)]
pub struct VendorRegistry {
    vendors: Vec<VendorConfig>,
    default_index: usize,
}

impl VendorRegistry {
    /// Build a registry from a configuration, validating it first
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ValidationError> {
        ConfigValidator::new().validate(config)?;

        let default_index = config
            .vendors
            .iter()
            .position(|v| v.model_prefix.is_none())
            .ok_or_else(|| ValidationError::required("vendors"))?;

        Ok(Self {
            vendors: config.vendors.clone(),
            default_index,
        })
    }

    /// The vendor serving model ids that match no prefix
    pub fn default_vendor(&self) -> &VendorConfig {
        &self.vendors[self.default_index]
    }

    /// Find the vendor for a model id. An absent or empty id selects the
    /// default vendor.
    pub fn vendor_for(&self, model: Option<&str>) -> &VendorConfig {
        let Some(model) = model.filter(|m| !m.is_empty()) else {
            return self.default_vendor();
        };

        self.vendors
            .iter()
            .filter_map(|v| {
                v.model_prefix
                    .as_deref()
                    .filter(|prefix| model.starts_with(prefix))
                    .map(|prefix| (prefix.len(), v))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, v)| v)
            .unwrap_or_else(|| self.default_vendor())
    }

    /// Resolve a requested model id to the vendor and the id sent upstream
    pub fn resolve(&self, model: Option<&str>) -> ResolvedModel {
        let vendor = self.vendor_for(model).clone();
        let model = model
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| vendor.default_model.clone());

        ResolvedModel { vendor, model }
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        let config = BridgeConfig::default();
        Self {
            vendors: config.vendors,
            default_index: 0,
        }
    }
}
