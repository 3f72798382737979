//! HTTP adapter for the reasoning provider port.
//!
//! Talks to an Anthropic-style streaming messages API. Each session
//! holds its conversation history; each send issues one streaming
//! request and the decoded chunks are classified into the engine's
//! chunk kinds. Tool execution itself is a collaborator concern; the
//! adapter only surfaces tool-use announcements as Tooling chunks.

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use serde_json::json;

use crate::domain::models::ProviderConfig;
use crate::domain::ports::{
    ChunkKind, ChunkStream, ProviderError, ReasoningProvider, ReasoningSession, SendOptions,
    SessionRequest, SessionStats, StreamChunk, ThinkLevel,
};
use crate::infrastructure::reasoning::sse::SseStream;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Default)]
struct UsageTotals {
    input_tokens: u64,
    output_tokens: u64,
}

/// Reasoning provider backed by an HTTP streaming messages API.
pub struct HttpReasoningProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpReasoningProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::SessionCreate(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ReasoningProvider for HttpReasoningProvider {
    async fn open(
        &self,
        request: SessionRequest,
    ) -> Result<Box<dyn ReasoningSession>, ProviderError> {
        let api_key = std::env::var(&self.config.api_key_env).map_err(|_| {
            ProviderError::SessionCreate(format!(
                "API key environment variable {} is not set",
                self.config.api_key_env
            ))
        })?;

        Ok(Box::new(HttpReasoningSession {
            client: self.client.clone(),
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            api_key,
            request,
            history: Arc::new(Mutex::new(Vec::new())),
            usage: Arc::new(Mutex::new(UsageTotals::default())),
            opened_at: Instant::now(),
            closed: false,
        }))
    }
}

/// One open conversation against the HTTP API.
pub struct HttpReasoningSession {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request: SessionRequest,
    history: Arc<Mutex<Vec<Message>>>,
    usage: Arc<Mutex<UsageTotals>>,
    opened_at: Instant,
    closed: bool,
}

impl HttpReasoningSession {
    fn thinking_budget(level: ThinkLevel) -> Option<u32> {
        match level {
            ThinkLevel::Off => None,
            ThinkLevel::Low => Some(1024),
            ThinkLevel::Medium => Some(4096),
            ThinkLevel::High => Some(16384),
        }
    }
}

#[async_trait]
impl ReasoningSession for HttpReasoningSession {
    async fn send(&mut self, text: &str, opts: SendOptions) -> Result<ChunkStream, ProviderError> {
        if self.closed {
            return Err(ProviderError::Request("session is closed".to_string()));
        }

        let messages = {
            let mut history = self.history.lock().expect("history lock poisoned");
            history.push(Message {
                role: "user".to_string(),
                content: text.to_string(),
            });
            history.clone()
        };

        let mut body = json!({
            "model": self.request.model,
            "system": self.request.system_prompt,
            "messages": messages,
            "max_tokens": opts.max_tokens,
            "temperature": opts.temperature,
            "top_p": opts.top_p,
            "stream": true,
        });
        if let Some(budget) = Self::thinking_budget(opts.think) {
            body["thinking"] = json!({ "type": "enabled", "budget_tokens": budget });
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!(
                "provider returned {}: {}",
                status, detail
            )));
        }

        let decoder = ChunkDecoder {
            inner: SseStream::new(response.bytes_stream()),
            assistant_text: String::new(),
            history: Arc::clone(&self.history),
            usage: Arc::clone(&self.usage),
        };
        Ok(Box::pin(decoder))
    }

    async fn stats(&self) -> Result<SessionStats, ProviderError> {
        let usage = self.usage.lock().expect("usage lock poisoned");
        let elapsed = self.opened_at.elapsed();
        let token_count = usage.input_tokens + usage.output_tokens;
        let secs = elapsed.as_secs_f64();
        Ok(SessionStats {
            token_count,
            compute_time_ms: elapsed.as_millis() as u64,
            tokens_per_second: if secs > 0.0 {
                usage.output_tokens as f64 / secs
            } else {
                0.0
            },
        })
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        self.closed = true;
        self.history.lock().expect("history lock poisoned").clear();
        Ok(())
    }
}

/// Translates decoded SSE payloads into typed stream chunks, keeping
/// conversation history and usage totals up to date as a side effect.
struct ChunkDecoder {
    inner: SseStream,
    assistant_text: String,
    history: Arc<Mutex<Vec<Message>>>,
    usage: Arc<Mutex<UsageTotals>>,
}

impl ChunkDecoder {
    fn translate(&mut self, event: &serde_json::Value) -> Option<Result<StreamChunk, ProviderError>> {
        match event["type"].as_str().unwrap_or_default() {
            "message_start" => {
                if let Some(input) = event["message"]["usage"]["input_tokens"].as_u64() {
                    self.usage.lock().expect("usage lock poisoned").input_tokens += input;
                }
                None
            }
            "content_block_start" => {
                let block = &event["content_block"];
                if block["type"].as_str() == Some("tool_use") {
                    let name = block["name"].as_str().unwrap_or("tool");
                    return Some(Ok(StreamChunk::new(ChunkKind::Tooling, name)));
                }
                None
            }
            "content_block_delta" => match event["delta"]["type"].as_str().unwrap_or_default() {
                "text_delta" => {
                    let text = event["delta"]["text"].as_str().unwrap_or_default();
                    self.assistant_text.push_str(text);
                    Some(Ok(StreamChunk::new(ChunkKind::Text, text)))
                }
                "input_json_delta" => {
                    let partial = event["delta"]["partial_json"].as_str().unwrap_or_default();
                    Some(Ok(StreamChunk::new(ChunkKind::ToolContent, partial)))
                }
                _ => Some(Ok(StreamChunk::new(ChunkKind::Other, ""))),
            },
            "message_delta" => {
                if let Some(output) = event["usage"]["output_tokens"].as_u64() {
                    self.usage.lock().expect("usage lock poisoned").output_tokens = output;
                }
                None
            }
            "message_stop" => {
                // Fold the finished reply into the conversation so the
                // next send carries it.
                if !self.assistant_text.is_empty() {
                    self.history
                        .lock()
                        .expect("history lock poisoned")
                        .push(Message {
                            role: "assistant".to_string(),
                            content: std::mem::take(&mut self.assistant_text),
                        });
                }
                None
            }
            "error" => {
                let message = event["error"]["message"]
                    .as_str()
                    .unwrap_or("unknown provider error");
                Some(Err(ProviderError::Stream(message.to_string())))
            }
            _ => None,
        }
    }
}

impl Stream for ChunkDecoder {
    type Item = Result<StreamChunk, ProviderError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if let Some(item) = this.translate(&event) {
                        return Poll::Ready(Some(item));
                    }
                }
                Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn decoder() -> ChunkDecoder {
        ChunkDecoder {
            inner: SseStream::new(futures::stream::empty()),
            assistant_text: String::new(),
            history: Arc::new(Mutex::new(Vec::new())),
            usage: Arc::new(Mutex::new(UsageTotals::default())),
        }
    }

    #[test]
    fn test_translate_text_delta() {
        let mut d = decoder();
        let event = json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "hi"}});
        let chunk = d.translate(&event).unwrap().unwrap();
        assert_eq!(chunk.kind, ChunkKind::Text);
        assert_eq!(chunk.content, "hi");
        assert_eq!(d.assistant_text, "hi");
    }

    #[test]
    fn test_translate_tool_use_start() {
        let mut d = decoder();
        let event = json!({"type": "content_block_start", "content_block": {"type": "tool_use", "name": "browser"}});
        let chunk = d.translate(&event).unwrap().unwrap();
        assert_eq!(chunk.kind, ChunkKind::Tooling);
        assert_eq!(chunk.content, "browser");
    }

    #[test]
    fn test_translate_usage_accumulation() {
        let mut d = decoder();
        d.translate(&json!({"type": "message_start", "message": {"usage": {"input_tokens": 12}}}));
        d.translate(&json!({"type": "message_delta", "usage": {"output_tokens": 34}}));
        let usage = d.usage.lock().unwrap();
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 34);
    }

    #[test]
    fn test_message_stop_folds_history() {
        let mut d = decoder();
        d.translate(&json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "reply"}}));
        d.translate(&json!({"type": "message_stop"}));
        let history = d.history.lock().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "assistant");
        assert_eq!(history[0].content, "reply");
    }

    #[test]
    fn test_translate_error_event() {
        let mut d = decoder();
        let event = json!({"type": "error", "error": {"type": "overloaded", "message": "try later"}});
        let item = d.translate(&event).unwrap();
        assert!(item.is_err());
    }

    #[tokio::test]
    async fn test_decoder_end_to_end() {
        use bytes::Bytes;

        let raw = concat!(
            "data: {\"type\":\"message_start\",\"message\":{\"usage\":{\"input_tokens\":5}}}\n\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n",
            "data: {\"type\":\"message_delta\",\"usage\":{\"output_tokens\":2}}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let byte_stream =
            futures::stream::iter(vec![reqwest::Result::Ok(Bytes::from(raw))]);

        let mut d = ChunkDecoder {
            inner: SseStream::new(byte_stream),
            assistant_text: String::new(),
            history: Arc::new(Mutex::new(Vec::new())),
            usage: Arc::new(Mutex::new(UsageTotals::default())),
        };
        let history = Arc::clone(&d.history);

        let mut chunks = Vec::new();
        while let Some(item) = d.next().await {
            chunks.push(item.unwrap());
        }

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello");
        assert_eq!(history.lock().unwrap().len(), 1);
    }
}
