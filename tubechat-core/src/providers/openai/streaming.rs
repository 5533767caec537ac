//! Server-sent event parsing for streamed chat completions
//!
//! The byte stream of a `stream: true` response is turned into a
//! [`DeltaStream`]: zero or more [`StreamEvent::Delta`] items followed by
//! exactly one [`StreamEvent::End`]. A transport failure, a malformed event or
//! an in-band error object yields one `Err` instead of the end event. Nothing
//! is produced after either terminal item.

use super::types::StreamChunk;
use crate::providers::error::{error_message_from_json, ProviderError, ProviderResult};
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::fmt;
use std::pin::Pin;

/// Sentinel payload closing an OpenAI event stream
const DONE_MARKER: &str = "[DONE]";

/// One item of a streamed completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text fragment
    Delta(String),
    /// The completion is finished
    End,
}

/// Lazy, finite, non-restartable sequence of stream events
pub type DeltaStream = Pin<Box<dyn Stream<Item = ProviderResult<StreamEvent>> + Send>>;

type SseStream<E> = Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<E>>> + Send>>;

struct ParserState<E> {
    events: SseStream<E>,
    finished: bool,
}

impl<E: fmt::Display> ParserState<E> {
    async fn next_item(&mut self) -> ProviderResult<StreamEvent> {
        loop {
            let event = match self.events.next().await {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(ProviderError::Stream(e.to_string()));
                }
                None => {
                    // Upstream closed without [DONE]; treated as a normal end
                    tracing::debug!("Event stream closed without done marker");
                    self.finished = true;
                    return Ok(StreamEvent::End);
                }
            };

            let data = event.data.trim();
            if data.is_empty() {
                continue;
            }
            if data == DONE_MARKER {
                self.finished = true;
                return Ok(StreamEvent::End);
            }

            match parse_chunk(data) {
                Ok(text) if text.is_empty() => continue,
                Ok(text) => return Ok(StreamEvent::Delta(text)),
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
    }
}

fn parse_chunk(data: &str) -> ProviderResult<String> {
    let value: Value = serde_json::from_str(data)?;

    if value.get("error").is_some() {
        let message = error_message_from_json(&value)
            .unwrap_or_else(|| "provider reported an error mid-stream".to_string());
        return Err(ProviderError::Stream(message));
    }

    let chunk: StreamChunk = serde_json::from_value(value)?;
    Ok(chunk.delta_text())
}

/// Parse a Server-Sent Events byte stream from an OpenAI-compatible API
pub fn parse_stream<S, B, E>(stream: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = ParserState {
        events: Box::pin(stream.eventsource()) as SseStream<E>,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        let item = state.next_item().await;
        Some((item, state))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io;

    fn sse(parts: &[&str]) -> DeltaStream {
        let chunks: Vec<Result<Bytes, io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        parse_stream(futures::stream::iter(chunks))
    }

    async fn collect(stream: DeltaStream) -> Vec<ProviderResult<StreamEvent>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_deltas_then_single_end() {
        let stream = sse(&[
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ]);

        let items: Vec<StreamEvent> = collect(stream)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(
            items,
            vec![
                StreamEvent::Delta("Hel".to_string()),
                StreamEvent::Delta("lo".to_string()),
                StreamEvent::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let stream = sse(&[
            "data: {\"choices\":[{\"delta\":",
            "{\"content\":\"Hi\"}}]}\n\ndata: [DO",
            "NE]\n\n",
        ]);

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &StreamEvent::Delta("Hi".to_string()));
        assert_eq!(items[1].as_ref().unwrap(), &StreamEvent::End);
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let stream = sse(&[
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ]);

        let items = collect(stream).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), &StreamEvent::End);
    }

    #[tokio::test]
    async fn test_eof_without_done_ends_stream() {
        let stream = sse(&["data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n"]);

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_ref().unwrap(), &StreamEvent::End);
    }

    #[tokio::test]
    async fn test_malformed_event_terminates_with_error() {
        let stream = sse(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
            "data: {not json}\n\n",
            "data: [DONE]\n\n",
        ]);

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(ProviderError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_in_band_error_object() {
        let stream = sse(&["data: {\"error\":{\"message\":\"overloaded\"}}\n\n"]);

        let items = collect(stream).await;
        assert_eq!(items.len(), 1);
        match &items[0] {
            Err(ProviderError::Stream(message)) => assert_eq!(message, "overloaded"),
            other => panic!("Expected stream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_terminates() {
        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from("data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from("data: [DONE]\n\n")),
        ];

        let items = collect(parse_stream(futures::stream::iter(chunks))).await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(ProviderError::Stream(_))));
    }
}
