//! Environment variable interpolation for configuration files

use super::error::ConfigError;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Replace every `${VAR}` reference in `content` with the variable's value.
///
/// Fails with the first variable that is not set.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(ConfigError::EnvVarNotFound {
                    var: var_name.to_string(),
                });
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars() {
        env::set_var("TUBECHAT_TEST_VAR", "test_value");

        let content = "base_url: ${TUBECHAT_TEST_VAR}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "base_url: test_value");

        env::remove_var("TUBECHAT_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let content = "base_url: ${TUBECHAT_MISSING_VAR}";
        let result = interpolate_env_vars(content);

        match result {
            Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "TUBECHAT_MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_without_placeholders_is_unchanged() {
        let content = "version: \"0.1\"\nvendors: []";
        assert_eq!(interpolate_env_vars(content).unwrap(), content);
    }
}
