//! OpenAI-compatible chat completion client
//!
//! Both built-in vendors speak the OpenAI wire format; they differ only in
//! base URL and in whether the bridge streams their responses.

mod client;
mod streaming;
pub mod types;

pub use client::LlmClient;
pub use streaming::{parse_stream, DeltaStream, StreamEvent};
pub use types::{ChatCompletionResponse, StreamChunk};
