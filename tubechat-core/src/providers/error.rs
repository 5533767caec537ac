//! Provider error types and handling

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when talking to an LLM provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Connection could not be established in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Insufficient quota
    #[error("Insufficient quota: {0}")]
    InsufficientQuota(String),

    /// Server side failure (5xx)
    #[error("Service temporarily unavailable ({status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// Provider returned an error we have no specific variant for
    #[error("Provider error: {code}: {message}")]
    Provider { code: String, message: String },

    /// The event stream broke off mid-response
    #[error("Stream error: {0}")]
    Stream(String),

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ProviderError {
    /// The message as reported, without the class prefix of `Display`
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Network(message)
            | ProviderError::Timeout(message)
            | ProviderError::Authentication(message)
            | ProviderError::RateLimit(message)
            | ProviderError::InvalidRequest(message)
            | ProviderError::ModelNotFound(message)
            | ProviderError::InsufficientQuota(message)
            | ProviderError::Stream(message)
            | ProviderError::ParseError(message) => message,
            ProviderError::ServiceUnavailable { message, .. }
            | ProviderError::Provider { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::ParseError(err.to_string())
    }
}

/// Map an unsuccessful HTTP status and its body to a [`ProviderError`].
///
/// OpenAI-style bodies (`{"error": {"message", "type", "code"}}`) are
/// classified by their error type first; anything else falls back to the
/// status code.
pub fn map_http_error(status: StatusCode, body: Option<String>) -> ProviderError {
    let details = body
        .as_deref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_details(&v));

    let message = details
        .as_ref()
        .map(|d| d.message.clone())
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    if let Some(kind) = details.as_ref().and_then(|d| d.kind.as_deref()) {
        match kind {
            "invalid_api_key" => return ProviderError::Authentication(message),
            "insufficient_quota" => return ProviderError::InsufficientQuota(message),
            "model_not_found" => return ProviderError::ModelNotFound(message),
            _ => {}
        }
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit(message),
        StatusCode::NOT_FOUND => ProviderError::ModelNotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest(message)
        }
        status if status.is_server_error() => ProviderError::ServiceUnavailable {
            status: status.as_u16(),
            message,
        },
        _ => ProviderError::Provider {
            code: status.as_u16().to_string(),
            message,
        },
    }
}

/// Error details extracted from a response body
struct ErrorDetails {
    message: String,
    kind: Option<String>,
}

/// Extract error details from a JSON error body, if it has a known shape
pub(crate) fn error_message_from_json(json: &Value) -> Option<String> {
    extract_error_details(json).map(|d| d.message)
}

fn extract_error_details(json: &Value) -> Option<ErrorDetails> {
    // OpenAI format: { "error": { "message": "...", "type": "...", "code": "..." } }
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
            let kind = error
                .get("code")
                .and_then(|v| v.as_str())
                .or_else(|| error.get("type").and_then(|v| v.as_str()))
                .map(str::to_string);
            return Some(ErrorDetails {
                message: message.to_string(),
                kind,
            });
        }
        if let Some(message) = error.as_str() {
            return Some(ErrorDetails {
                message: message.to_string(),
                kind: None,
            });
        }
    }

    // Generic format: { "message": "..." }
    json.get("message")
        .and_then(|v| v.as_str())
        .map(|message| ErrorDetails {
            message: message.to_string(),
            kind: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_openai_error_body_classified_by_code() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = map_http_error(StatusCode::UNAUTHORIZED, Some(body.to_string()));
        match err {
            ProviderError::Authentication(message) => {
                assert_eq!(message, "Incorrect API key provided")
            }
            other => panic!("Expected Authentication, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_message() {
        let body = r#"{"error":{"message":"slow down","retry_after":7}}"#;
        match map_http_error(StatusCode::TOO_MANY_REQUESTS, Some(body.to_string())) {
            ProviderError::RateLimit(message) => assert_eq!(message, "slow down"),
            other => panic!("Expected RateLimit, got {:?}", other),
        }
    }

    #[test]
    fn test_message_drops_class_prefix() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, Some("upstream down".to_string()));
        assert_eq!(err.to_string(), "Service temporarily unavailable (502): upstream down");
        assert_eq!(err.message(), "upstream down");
        assert_eq!(ProviderError::Stream("reset".into()).message(), "reset");
    }

    #[test_case(StatusCode::BAD_REQUEST, "Invalid request: bad" ; "bad request")]
    #[test_case(StatusCode::NOT_FOUND, "Model not found: bad" ; "not found")]
    #[test_case(StatusCode::BAD_GATEWAY, "Service temporarily unavailable (502): bad" ; "bad gateway")]
    #[test_case(StatusCode::IM_A_TEAPOT, "Provider error: 418: bad" ; "other status")]
    fn test_plain_body_falls_back_to_status(status: StatusCode, expected: &str) {
        let err = map_http_error(status, Some("bad".to_string()));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_empty_body_uses_status_text() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, None);
        assert_eq!(
            err.to_string(),
            "Service temporarily unavailable (503): HTTP error 503"
        );
    }
}
