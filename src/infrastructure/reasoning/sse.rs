//! Server-Sent Events decoding for the streaming messages endpoint.
//!
//! The service emits `data: {json}` records separated by blank lines.
//! This decoder buffers the byte stream, splits on record boundaries,
//! and yields the parsed JSON payloads. Event-type routing happens in
//! the session layer, which reads the `type` field of each payload.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tracing::warn;

use crate::domain::ports::ProviderError;

/// SSE record parser over a raw byte stream.
pub struct SseStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: String,
}

impl SseStream {
    pub fn new(stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
            buffer: String::new(),
        }
    }

    /// Parse one SSE record into its JSON payload. Returns `None` for
    /// records that carry no payload (comments, keepalives, `[DONE]`).
    fn parse_record(record: &str) -> Option<Result<serde_json::Value, ProviderError>> {
        let mut data = None;
        for line in record.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(value) = line.strip_prefix("data:") {
                data = Some(value.trim());
            }
        }

        let data = data?;
        if data.is_empty() || data == "[DONE]" {
            return None;
        }

        match serde_json::from_str::<serde_json::Value>(data) {
            Ok(value) => Some(Ok(value)),
            Err(err) => {
                warn!("failed to parse SSE event: {} - data: {}", err, data);
                Some(Err(ProviderError::InvalidResponse(err.to_string())))
            }
        }
    }
}

impl Stream for SseStream {
    type Item = Result<serde_json::Value, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Drain complete records from the buffer first.
            if let Some(boundary) = self.buffer.find("\n\n") {
                let record = self.buffer[..boundary].to_string();
                self.buffer.drain(..boundary + 2);

                if let Some(item) = Self::parse_record(&record) {
                    return Poll::Ready(Some(item));
                }
                continue;
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Poll::Ready(Some(Err(err))) => {
                    return Poll::Ready(Some(Err(ProviderError::Stream(err.to_string()))));
                }
                Poll::Ready(None) => {
                    // Stream ended; a partial record without its blank
                    // line is still worth parsing.
                    if !self.buffer.trim().is_empty() {
                        let record = std::mem::take(&mut self.buffer);
                        if let Some(item) = Self::parse_record(&record) {
                            return Poll::Ready(Some(item));
                        }
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
