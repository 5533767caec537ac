//! Configuration validation utilities

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::BridgeConfig;
use std::collections::HashSet;
use url::Url;

/// Checks a [`BridgeConfig`] for routing ambiguities and malformed endpoints
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration, returning the first problem found
    pub fn validate(&self, config: &BridgeConfig) -> Result<(), ValidationError> {
        if config.version.trim().is_empty() {
            return Err(ValidationError::required("version"));
        }
        if config.vendors.is_empty() {
            return Err(ValidationError::required("vendors"));
        }

        self.validate_vendors(config)?;
        self.validate_default_route(config)?;

        Ok(())
    }

    fn validate_vendors(&self, config: &BridgeConfig) -> Result<(), ValidationError> {
        let mut names = HashSet::new();
        let mut prefixes = HashSet::new();

        for (i, vendor) in config.vendors.iter().enumerate() {
            let path = format!("vendors[{}]", i);

            if vendor.name.trim().is_empty() {
                return Err(ValidationError::required(format!("{}.name", path)));
            }
            if !names.insert(vendor.name.as_str()) {
                return Err(ValidationError::duplicate(
                    format!("{}.name", path),
                    &vendor.name,
                ));
            }

            if let Some(prefix) = &vendor.model_prefix {
                if prefix.is_empty() {
                    return Err(ValidationError::required(format!("{}.model_prefix", path)));
                }
                if !prefixes.insert(prefix.as_str()) {
                    return Err(ValidationError::duplicate(
                        format!("{}.model_prefix", path),
                        prefix,
                    ));
                }
            }

            if vendor.default_model.trim().is_empty() {
                return Err(ValidationError::required(format!("{}.default_model", path)));
            }

            validate_base_url(&format!("{}.base_url", path), &vendor.base_url)?;
        }

        Ok(())
    }

    fn validate_default_route(&self, config: &BridgeConfig) -> Result<(), ValidationError> {
        let defaults = config
            .vendors
            .iter()
            .filter(|v| v.model_prefix.is_none())
            .count();

        if defaults != 1 {
            return Err(ValidationError::new(
                "vendors",
                ValidationErrorKind::Incompatible {
                    message: format!(
                        "exactly one vendor must omit model_prefix, found {}",
                        defaults
                    ),
                },
            ));
        }

        Ok(())
    }
}

fn validate_base_url(field_path: &str, value: &str) -> Result<(), ValidationError> {
    let invalid = |message: String| {
        ValidationError::new(field_path, ValidationErrorKind::InvalidUrl { message })
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
