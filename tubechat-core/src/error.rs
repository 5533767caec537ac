//! Bridge error taxonomy
//!
//! Every failure a request can hit is one of these variants. The port handler
//! renders [`BridgeError::frame_message`] into the terminal error frame, so the
//! messages are written for the extension user. Provider messages pass through
//! as reported.

use crate::providers::ProviderError;
use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Text sent when an error renders to nothing
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors surfaced to the caller of a port
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The API key is unusable or the HTTP client could not be built
    #[error("{0}")]
    Configuration(String),

    /// The request context carries no API key
    #[error("OpenAI API key is not set")]
    MissingCredential,

    /// The request context carries no transcript, or one without events
    #[error("Transcript data is missing. Please make sure the video has captions/subtitles.")]
    MissingTranscript,

    /// The request context carries no metadata, or an empty title
    #[error("Video metadata is missing")]
    MissingMetadata,

    /// The inbound payload could not be decoded
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    /// The provider call failed
    #[error(transparent)]
    Upstream(#[from] ProviderError),
}

impl BridgeError {
    /// Text placed in the terminal error frame
    pub fn frame_message(&self) -> String {
        let message = match self {
            BridgeError::Upstream(err) => err.message().to_string(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidPayload(err.to_string())
    }
}
