//! Completion dispatcher
//!
//! Validates the request context, builds the prompt, picks the call shape from
//! the vendor record and performs exactly one provider call. No retries.

use crate::config::{BridgeConfig, ConfigError, SecretString};
use crate::error::{BridgeError, BridgeResult};
use crate::prompt::{build_completion_prompt, build_transcript_text, inject_system_message, preview};
use crate::protocol::{Message, RequestContext, TranscriptEvent};
use crate::providers::{CallMode, ClientFactory, DeltaStream, LlmClient};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Normalized outcome of a dispatch
pub enum CompletionResult {
    /// Whole answer, already materialized
    Standard { content: String },
    /// Incremental answer
    Stream(DeltaStream),
}

impl CompletionResult {
    /// Call mode that produced this result
    pub fn mode(&self) -> CallMode {
        match self {
            CompletionResult::Standard { .. } => CallMode::Standard,
            CompletionResult::Stream(_) => CallMode::Stream,
        }
    }
}

impl fmt::Debug for CompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionResult::Standard { content } => f
                .debug_struct("Standard")
                .field("content", content)
                .finish(),
            CompletionResult::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Request context that passed validation
#[derive(Debug, Clone, Copy)]
pub struct ValidatedContext<'a> {
    pub api_key: &'a SecretString,
    pub events: &'a [TranscriptEvent],
    pub title: &'a str,
}

/// Check the context in a fixed order; the first failure wins.
///
/// 1. API key present and non-empty
/// 2. transcript present with an `events` field (an empty list is fine)
/// 3. metadata present with a non-empty title
pub fn validate_context(context: &RequestContext) -> BridgeResult<ValidatedContext<'_>> {
    let api_key = context
        .api_key
        .as_ref()
        .filter(|key| !key.is_empty())
        .ok_or(BridgeError::MissingCredential)?;

    let events = context
        .transcript
        .as_ref()
        .and_then(|t| t.events.as_deref())
        .ok_or(BridgeError::MissingTranscript)?;

    let title = context
        .metadata
        .as_ref()
        .and_then(|m| m.title.as_deref())
        .filter(|title| !title.is_empty())
        .ok_or(BridgeError::MissingMetadata)?;

    Ok(ValidatedContext {
        api_key,
        events,
        title,
    })
}

/// Drives one provider call per request
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    factory: ClientFactory,
}

impl Dispatcher {
    /// Create a dispatcher over an existing client factory
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }

    /// Create a dispatcher from a configuration, validating it first
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ClientFactory::from_config(config)?))
    }

    /// Chat variant: prepends the transcript system message to `messages`
    /// (in place) and sends the whole conversation.
    pub async fn dispatch_chat(
        &self,
        model: Option<&str>,
        messages: &mut Vec<Message>,
        context: &RequestContext,
        request_id: Uuid,
    ) -> BridgeResult<CompletionResult> {
        log_presence(context, request_id);
        let validated = validate_context(context)?;
        let client = self.factory.create_client(validated.api_key, model)?;

        let transcript = build_transcript_text(validated.events);
        inject_system_message(messages, validated.title, &transcript);
        debug!(
            "Chat request with {} messages, system prompt: {} [request_id: {}]",
            messages.len(),
            preview(&messages[0].content),
            request_id
        );

        execute(&client, messages.as_slice(), request_id).await
    }

    /// Completion variant: one user message built from `prompt`, no history
    pub async fn dispatch_completion(
        &self,
        model: Option<&str>,
        prompt: &str,
        context: &RequestContext,
        request_id: Uuid,
    ) -> BridgeResult<CompletionResult> {
        log_presence(context, request_id);
        let validated = validate_context(context)?;
        let client = self.factory.create_client(validated.api_key, model)?;

        let transcript = build_transcript_text(validated.events);
        let message = build_completion_prompt(prompt, validated.title, &transcript);
        debug!(
            "Completion request, user prompt: {} [request_id: {}]",
            preview(&message.content),
            request_id
        );

        execute(&client, &[message], request_id).await
    }
}

fn log_presence(context: &RequestContext, request_id: Uuid) {
    let presence = context.presence();
    debug!(
        "Context received: api_key={}, transcript={}, events={}, metadata={} [request_id: {}]",
        presence.has_api_key,
        presence.has_transcript,
        presence.has_events,
        presence.has_metadata,
        request_id
    );
}

async fn execute(
    client: &LlmClient,
    messages: &[Message],
    request_id: Uuid,
) -> BridgeResult<CompletionResult> {
    match client.call_mode() {
        CallMode::Standard => {
            info!(
                "Using non-streaming mode for {} [request_id: {}]",
                client.vendor(),
                request_id
            );
            let response = client.chat_completion(messages, request_id).await?;
            Ok(CompletionResult::Standard {
                content: response.joined_content(),
            })
        }
        CallMode::Stream => {
            let stream = client.chat_completion_stream(messages, request_id).await?;
            Ok(CompletionResult::Stream(stream))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Transcript, VideoMetadata};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher_for(server: &MockServer) -> Dispatcher {
        let mut config = BridgeConfig::default();
        config.vendors[0].base_url = server.uri();
        config.vendors[1].base_url = format!("{}/qwen", server.uri());
        Dispatcher::from_config(&config).unwrap()
    }

    fn full_context() -> RequestContext {
        RequestContext::new(
            "sk-x",
            Transcript::new(vec![TranscriptEvent::from_texts(["Hi", "there"])]),
            "T",
        )
    }

    #[test]
    fn test_valid_context() {
        let context = full_context();
        let validated = validate_context(&context).unwrap();
        assert_eq!(validated.api_key.expose_secret(), "sk-x");
        assert_eq!(validated.events.len(), 1);
        assert_eq!(validated.title, "T");
    }

    #[test]
    fn test_missing_key_checked_first() {
        let context = RequestContext::default();
        assert!(matches!(
            validate_context(&context),
            Err(BridgeError::MissingCredential)
        ));

        let mut context = full_context();
        context.api_key = Some(SecretString::new(""));
        context.transcript = None;
        assert!(matches!(
            validate_context(&context),
            Err(BridgeError::MissingCredential)
        ));
    }

    #[test]
    fn test_transcript_without_events() {
        let mut context = full_context();
        context.transcript = Some(Transcript::default());
        context.metadata = None;
        assert!(matches!(
            validate_context(&context),
            Err(BridgeError::MissingTranscript)
        ));
    }

    #[test]
    fn test_empty_events_are_valid() {
        let mut context = full_context();
        context.transcript = Some(Transcript::new(Vec::new()));
        assert!(validate_context(&context).is_ok());
    }

    #[test]
    fn test_empty_title() {
        let mut context = full_context();
        context.metadata = Some(VideoMetadata {
            title: Some(String::new()),
        });
        assert!(matches!(
            validate_context(&context),
            Err(BridgeError::MissingMetadata)
        ));

        context.metadata = None;
        assert!(matches!(
            validate_context(&context),
            Err(BridgeError::MissingMetadata)
        ));
    }

    #[test]
    fn test_whitespace_key_passes_validation() {
        // Blank keys are rejected by the client factory, not here
        let mut context = full_context();
        context.api_key = Some(SecretString::new("   "));
        assert!(validate_context(&context).is_ok());
    }

    #[tokio::test]
    async fn test_whitespace_key_fails_before_history_changes() {
        let mut context = full_context();
        context.api_key = Some(SecretString::new("   "));
        let mut messages = vec![Message::user("Summarize")];

        let err = Dispatcher::default()
            .dispatch_chat(Some("gpt-4o-mini"), &mut messages, &context, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Configuration(_)));
        assert_eq!(messages, vec![Message::user("Summarize")]);
    }

    #[tokio::test]
    async fn test_non_streaming_vendor_yields_standard_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/qwen/chat/completions"))
            .and(body_partial_json(json!({"model": "qwen-max", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "one"}},
                    {"index": 1, "message": {"role": "assistant", "content": "two"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut messages = vec![Message::user("Summarize")];
        let result = dispatcher_for(&server)
            .dispatch_chat(Some("qwen-max"), &mut messages, &full_context(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(result.mode(), CallMode::Standard);
        match result {
            CompletionResult::Standard { content } => assert_eq!(content, "one\ntwo"),
            other => panic!("Expected Standard, got {:?}", other),
        }
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_streaming_vendor_yields_stream_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "stream": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = dispatcher_for(&server)
            .dispatch_completion(None, "Key points", &full_context(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(result.mode(), CallMode::Stream);
    }
}
