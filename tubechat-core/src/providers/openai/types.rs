//! OpenAI chat-completions wire types
//!
//! Only the fields the bridge reads or writes are modeled; unknown fields in
//! responses are ignored.

use crate::protocol::Message;
use serde::{Deserialize, Serialize};

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

/// Non-streaming chat completion response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatCompletionResponse {
    /// All choice contents joined by newlines; empty when there are no choices.
    /// A choice without content contributes an empty line.
    pub fn joined_content(&self) -> String {
        self.choices
            .iter()
            .map(|choice| {
                choice
                    .message
                    .as_ref()
                    .and_then(|m| m.content.as_deref())
                    .unwrap_or("")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One choice of a chat completion response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub message: Option<ChoiceMessage>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message of a choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// One `data:` payload of a streamed response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// Text carried by this chunk across all choices
    pub fn delta_text(&self) -> String {
        self.choices
            .iter()
            .filter_map(|c| c.delta.content.as_deref())
            .collect()
    }
}

/// Streamed choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,

    #[serde(default)]
    pub delta: StreamDelta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental message content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}
