//! Frame sinks: where a request's response frames go
//!
//! The messaging transport is external. It plugs in by implementing
//! [`FrameSink`]; [`ChannelSink`] covers in-process consumers.

use crate::protocol::ResponseFrame;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// The receiving side of a response channel has gone away
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("response channel closed")]
pub struct SinkClosed;

/// Accepts the frames of one request, in order
#[async_trait]
pub trait FrameSink: Send {
    /// Deliver one frame
    async fn send(&mut self, frame: ResponseFrame) -> Result<(), SinkClosed>;
}

/// Sink backed by an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ResponseFrame>,
}

impl ChannelSink {
    /// Wrap an existing sender
    pub fn new(tx: mpsc::UnboundedSender<ResponseFrame>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiver
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ResponseFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send(&mut self, frame: ResponseFrame) -> Result<(), SinkClosed> {
        self.tx.send(frame).map_err(|_| SinkClosed)
    }
}

/// Collects frames in memory
#[async_trait]
impl FrameSink for Vec<ResponseFrame> {
    async fn send(&mut self, frame: ResponseFrame) -> Result<(), SinkClosed> {
        self.push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (mut sink, mut rx) = ChannelSink::channel();
        sink.send(ResponseFrame::content("a")).await.unwrap();
        sink.send(ResponseFrame::end()).await.unwrap();

        assert_eq!(rx.recv().await, Some(ResponseFrame::content("a")));
        assert_eq!(rx.recv().await, Some(ResponseFrame::end()));
    }

    #[tokio::test]
    async fn test_closed_channel_reports_error() {
        let (mut sink, rx) = ChannelSink::channel();
        drop(rx);
        assert_eq!(sink.send(ResponseFrame::end()).await, Err(SinkClosed));
    }
}
