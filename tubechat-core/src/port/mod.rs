//! Port handling: one inbound message in, a sequence of response frames out
//!
//! Each request moves through
//! `Received -> Dispatching -> (Standard | Streaming) -> Terminated`
//! and reaches `Terminated` exactly once, with exactly one `isEnd` frame.

mod handler;
mod sink;

pub use handler::{relay, PortHandler};
pub use sink::{ChannelSink, FrameSink, SinkClosed};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named ports the extension UI connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// Conversation with history, transcript in the system message
    Chat,
    /// One-shot prompt, transcript in the user message
    Completion,
}

impl PortKind {
    /// Port name as used by the extension
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Chat => "chat",
            PortKind::Completion => "completion",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(PortKind::Chat),
            "completion" => Ok(PortKind::Completion),
            other => Err(format!("unknown port '{}'", other)),
        }
    }
}

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Dispatching,
    Standard,
    Streaming,
    Terminated,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::Dispatching => "dispatching",
            RequestState::Standard => "standard",
            RequestState::Streaming => "streaming",
            RequestState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
