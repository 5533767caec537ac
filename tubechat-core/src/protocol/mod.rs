//! Protocol module for the messages exchanged with the extension UI
//!
//! Inbound payloads (chat and completion ports), the request context they
//! carry, and the response frames relayed back.

pub mod types;

pub use types::{
    ChatPayload, CompletionPayload, ContextPresence, Message, MessageRole, RequestContext,
    ResponseFrame, Segment, Transcript, TranscriptEvent, VideoMetadata, END_MESSAGE,
};
