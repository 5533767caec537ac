//! Wire types exchanged with the extension UI
//!
//! Field names follow the JSON produced by the extension front end
//! (`openAIKey`, `isEnd`, ...). Everything the UI might omit is optional here so
//! that missing data surfaces as a validation error from the dispatcher
//! instead of a decode failure.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Message text of the terminal success frame
pub const END_MESSAGE: &str = "END";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Smallest text unit of a caption entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Raw caption text. A missing value contributes an empty string.
    #[serde(default)]
    pub utf8: Option<String>,
}

impl Segment {
    /// Create a segment from text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            utf8: Some(text.into()),
        }
    }

    /// The segment text, empty when absent
    pub fn text(&self) -> &str {
        self.utf8.as_deref().unwrap_or("")
    }
}

/// One timed caption entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Text segments; timing-only events carry none
    #[serde(default)]
    pub segs: Option<Vec<Segment>>,
}

impl TranscriptEvent {
    /// Create an event from segment texts
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segs: Some(texts.into_iter().map(Segment::new).collect()),
        }
    }
}

/// Caption track of a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Ordered caption entries
    #[serde(default)]
    pub events: Option<Vec<TranscriptEvent>>,
}

impl Transcript {
    /// Create a transcript holding the given events
    pub fn new(events: Vec<TranscriptEvent>) -> Self {
        Self {
            events: Some(events),
        }
    }
}

/// Video metadata supplied by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
}

/// Per-request context sent along with every chat or completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Provider API key
    #[serde(rename = "openAIKey", default)]
    pub api_key: Option<SecretString>,

    /// Caption track of the current video
    #[serde(default)]
    pub transcript: Option<Transcript>,

    /// Metadata of the current video
    #[serde(default)]
    pub metadata: Option<VideoMetadata>,
}

impl RequestContext {
    /// Build a fully populated context
    pub fn new(
        api_key: impl Into<SecretString>,
        transcript: Transcript,
        title: impl Into<String>,
    ) -> Self {
        Self {
            api_key: Some(api_key.into()),
            transcript: Some(transcript),
            metadata: Some(VideoMetadata {
                title: Some(title.into()),
            }),
        }
    }

    /// Presence summary for diagnostics. Never includes the key itself.
    pub fn presence(&self) -> ContextPresence {
        ContextPresence {
            has_api_key: self.api_key.as_ref().is_some_and(|k| !k.is_empty()),
            has_transcript: self.transcript.is_some(),
            has_events: self
                .transcript
                .as_ref()
                .is_some_and(|t| t.events.is_some()),
            has_metadata: self.metadata.is_some(),
        }
    }
}

/// Which parts of a [`RequestContext`] were supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextPresence {
    pub has_api_key: bool,
    pub has_transcript: bool,
    pub has_events: bool,
    pub has_metadata: bool,
}

/// Body of a request on the chat port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Requested model id
    #[serde(default)]
    pub model: Option<String>,

    /// Conversation so far, oldest first. Required.
    pub messages: Vec<Message>,

    /// Video context
    #[serde(default)]
    pub context: RequestContext,
}

/// Body of a request on the completion port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    /// Free-form instruction from the user
    #[serde(default)]
    pub prompt: String,

    /// Requested model id
    #[serde(default)]
    pub model: Option<String>,

    /// Video context
    #[serde(default)]
    pub context: RequestContext,
}

/// One outbound frame on a response channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFrame {
    /// Content so far, `"END"` on the terminal success frame, null on error
    pub message: Option<String>,

    /// Failure description on the terminal error frame
    pub error: Option<String>,

    /// Set on the last frame of a request
    #[serde(rename = "isEnd")]
    pub is_end: bool,
}

impl ResponseFrame {
    /// Non-terminal frame carrying content
    pub fn content(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
            is_end: false,
        }
    }

    /// Terminal success frame
    pub fn end() -> Self {
        Self {
            message: Some(END_MESSAGE.to_string()),
            error: None,
            is_end: true,
        }
    }

    /// Terminal error frame
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
            is_end: true,
        }
    }

    /// Whether this is the terminal success frame
    pub fn is_success_end(&self) -> bool {
        self.is_end && self.error.is_none() && self.message.as_deref() == Some(END_MESSAGE)
    }
}
