//! API keys keep their value through serde but never show up in logs

use tubechat_core::config::SecretString;
use tubechat_core::protocol::RequestContext;

#[test]
fn test_context_key_roundtrip_and_redaction() {
    let context: RequestContext = serde_json::from_str(
        r#"{"openAIKey": "sk-secret-key-123", "metadata": {"title": "T"}}"#,
    )
    .unwrap();

    let key = context.api_key.as_ref().unwrap();
    assert_eq!(key.expose_secret(), "sk-secret-key-123");

    let debug_output = format!("{:?}", context);
    assert!(!debug_output.contains("sk-secret-key-123"));
    assert!(debug_output.contains("[REDACTED]"));

    let json = serde_json::to_string(&context).unwrap();
    assert!(json.contains("\"openAIKey\":\"sk-secret-key-123\""));
}

#[test]
fn test_display_is_redacted() {
    let secret = SecretString::new("my-api-key-value");
    assert_eq!(format!("{}", secret), "[REDACTED]");
    assert_eq!(secret.partial_redact(), "my...ue");
}
