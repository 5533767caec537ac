//! Port handler: drives the dispatcher and relays its output as frames

use super::sink::{ChannelSink, FrameSink};
use super::{PortKind, RequestState};
use crate::config::{BridgeConfig, ConfigError};
use crate::dispatch::{CompletionResult, Dispatcher};
use crate::error::{BridgeError, BridgeResult};
use crate::protocol::{ChatPayload, CompletionPayload, ResponseFrame};
use crate::providers::StreamEvent;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Entry point for inbound port messages. Cheap to clone; clones share the
/// dispatcher.
#[derive(Debug, Clone, Default)]
pub struct PortHandler {
    dispatcher: Arc<Dispatcher>,
}

impl PortHandler {
    /// Create a handler over a dispatcher
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Create a handler from a configuration, validating it first
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Dispatcher::from_config(config)?))
    }

    /// Handle one request on a background task and return its frame receiver.
    ///
    /// Must be called within a tokio runtime. Dropping the receiver stops the
    /// relay at the next frame.
    pub fn open(&self, port: PortKind, body: Value) -> mpsc::UnboundedReceiver<ResponseFrame> {
        let (mut sink, rx) = ChannelSink::channel();
        let handler = self.clone();
        tokio::spawn(async move {
            handler.handle(port, body, &mut sink).await;
        });
        rx
    }

    /// Decode a raw payload for `port` and handle it
    pub async fn handle<S>(&self, port: PortKind, body: Value, sink: &mut S)
    where
        S: FrameSink + ?Sized,
    {
        match port {
            PortKind::Chat => match serde_json::from_value::<ChatPayload>(body) {
                Ok(payload) => self.handle_chat(payload, sink).await,
                Err(e) => reject(port, BridgeError::from(e), sink).await,
            },
            PortKind::Completion => match serde_json::from_value::<CompletionPayload>(body) {
                Ok(payload) => self.handle_completion(payload, sink).await,
                Err(e) => reject(port, BridgeError::from(e), sink).await,
            },
        }
    }

    /// Handle a chat port request
    pub async fn handle_chat<S>(&self, payload: ChatPayload, sink: &mut S)
    where
        S: FrameSink + ?Sized,
    {
        let ChatPayload {
            model,
            mut messages,
            context,
        } = payload;

        let mut responder = Responder::new(sink, PortKind::Chat);
        debug!(
            "Chat request received for model {} with {} messages [request_id: {}]",
            model.as_deref().unwrap_or("<default>"),
            messages.len(),
            responder.request_id
        );

        responder.transition(RequestState::Dispatching);
        let result = self
            .dispatcher
            .dispatch_chat(model.as_deref(), &mut messages, &context, responder.request_id)
            .await;
        responder.finish(result).await;
    }

    /// Handle a completion port request
    pub async fn handle_completion<S>(&self, payload: CompletionPayload, sink: &mut S)
    where
        S: FrameSink + ?Sized,
    {
        let CompletionPayload {
            prompt,
            model,
            context,
        } = payload;

        let mut responder = Responder::new(sink, PortKind::Completion);
        debug!(
            "Completion request received for model {} [request_id: {}]",
            model.as_deref().unwrap_or("<default>"),
            responder.request_id
        );

        responder.transition(RequestState::Dispatching);
        let result = self
            .dispatcher
            .dispatch_completion(model.as_deref(), &prompt, &context, responder.request_id)
            .await;
        responder.finish(result).await;
    }
}

/// Relay an already dispatched result to `sink`
pub async fn relay<S>(result: CompletionResult, sink: &mut S, port: PortKind)
where
    S: FrameSink + ?Sized,
{
    let mut responder = Responder::new(sink, port);
    responder.transition(RequestState::Dispatching);
    responder.finish(Ok(result)).await;
}

async fn reject<S>(port: PortKind, err: BridgeError, sink: &mut S)
where
    S: FrameSink + ?Sized,
{
    let mut responder = Responder::new(sink, port);
    responder.fail(err).await;
}

/// Frame writer for one request; enforces the single terminal frame
struct Responder<'a, S: ?Sized> {
    sink: &'a mut S,
    port: PortKind,
    request_id: Uuid,
    state: RequestState,
    closed: bool,
}

impl<'a, S> Responder<'a, S>
where
    S: FrameSink + ?Sized,
{
    fn new(sink: &'a mut S, port: PortKind) -> Self {
        Self {
            sink,
            port,
            request_id: Uuid::new_v4(),
            state: RequestState::Received,
            closed: false,
        }
    }

    fn transition(&mut self, next: RequestState) {
        debug!(
            "{} request {} -> {} [request_id: {}]",
            self.port, self.state, next, self.request_id
        );
        self.state = next;
    }

    /// Send a frame; false once the request is over or the receiver is gone
    async fn emit(&mut self, frame: ResponseFrame) -> bool {
        if self.closed || self.state == RequestState::Terminated {
            return false;
        }
        if frame.is_end {
            self.transition(RequestState::Terminated);
        }

        match self.sink.send(frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Dropping remaining frames: {} [request_id: {}]",
                    e, self.request_id
                );
                self.closed = true;
                false
            }
        }
    }

    async fn fail(&mut self, err: BridgeError) {
        error!(
            "{} request failed: {} [request_id: {}]",
            self.port, err, self.request_id
        );
        self.emit(ResponseFrame::failure(err.frame_message())).await;
    }

    async fn finish(&mut self, result: BridgeResult<CompletionResult>) {
        match result {
            Ok(CompletionResult::Standard { content }) => {
                self.transition(RequestState::Standard);
                if self.emit(ResponseFrame::content(content)).await {
                    self.emit(ResponseFrame::end()).await;
                }
            }
            Ok(CompletionResult::Stream(mut stream)) => {
                self.transition(RequestState::Streaming);
                let mut accumulated = String::new();

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(StreamEvent::Delta(delta)) => {
                            accumulated.push_str(&delta);
                            if !self.emit(ResponseFrame::content(accumulated.clone())).await {
                                return;
                            }
                        }
                        Ok(StreamEvent::End) => {
                            self.emit(ResponseFrame::end()).await;
                            return;
                        }
                        Err(e) => {
                            self.fail(BridgeError::Upstream(e)).await;
                            return;
                        }
                    }
                }

                // Source ran dry without an end event
                self.emit(ResponseFrame::end()).await;
            }
            Err(err) => self.fail(err).await,
        }
    }
}
