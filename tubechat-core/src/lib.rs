//! TubeChat Core Library
//!
//! Backend bridge for the TubeChat browser extension. A request arrives on a
//! port (chat or completion) together with the video transcript, metadata and
//! the user's API key; the bridge builds a transcript-aware prompt, calls an
//! OpenAI-compatible chat completion API and relays the answer back as a
//! sequence of response frames.
//!
//! ```no_run
//! use tubechat_core::port::{PortHandler, PortKind};
//! use serde_json::json;
//!
//! # async fn run() {
//! let handler = PortHandler::default();
//! let mut frames = handler.open(
//!     PortKind::Chat,
//!     json!({
//!         "model": "gpt-4o-mini",
//!         "messages": [{"role": "user", "content": "Summarize"}],
//!         "context": {
//!             "openAIKey": "sk-...",
//!             "transcript": {"events": [{"segs": [{"utf8": "Hi"}, {"utf8": "there"}]}]},
//!             "metadata": {"title": "T"}
//!         }
//!     }),
//! );
//! while let Some(frame) = frames.recv().await {
//!     println!("{:?}", frame);
//! }
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod port;
pub mod prompt;
pub mod protocol;
pub mod providers;

pub use dispatch::{CompletionResult, Dispatcher};
pub use error::{BridgeError, BridgeResult};
pub use port::{PortHandler, PortKind};
pub use protocol::{Message, MessageRole, RequestContext, ResponseFrame};

/// Returns the version of the TubeChat core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
