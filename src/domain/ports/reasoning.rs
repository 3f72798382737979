//! Reasoning provider port.
//!
//! A session is opened with a system prompt and tool-group selection,
//! accepts user messages, and streams back typed content chunks. All
//! provider failures are retryable from the engine's point of view.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced by a reasoning provider or session.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("session creation failed: {0}")]
    SessionCreate(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Kind of a streamed content chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Assistant prose.
    Text,
    /// Content produced by a tool invocation.
    ToolContent,
    /// A tool invocation announcement (tool name / call metadata).
    Tooling,
    /// Anything else (thinking, pings, unknown block types).
    Other,
}

/// One typed chunk of a streamed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub kind: ChunkKind,
    pub content: String,
}

impl StreamChunk {
    pub fn new(kind: ChunkKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Usage statistics for a session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub token_count: u64,
    pub compute_time_ms: u64,
    pub tokens_per_second: f64,
}

/// Requested reasoning effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkLevel {
    Off,
    Low,
    Medium,
    High,
}

impl Default for ThinkLevel {
    fn default() -> Self {
        Self::Off
    }
}

impl ThinkLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(Self::Off),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Parameters for opening a session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub model: String,
    pub system_prompt: String,
    pub think: ThinkLevel,
    pub tool_groups: Vec<String>,
}

/// Per-send sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub think: ThinkLevel,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 4096,
            think: ThinkLevel::Off,
        }
    }
}

/// Stream of typed chunks from one send.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// One open conversation with the reasoning provider.
///
/// Sessions hold conversation state across sends. `close` is best
/// effort; the engine always calls it before discarding a session,
/// including on error paths.
#[async_trait]
pub trait ReasoningSession: Send + Sync {
    /// Send a user message and stream back the response.
    async fn send(&mut self, text: &str, opts: SendOptions) -> Result<ChunkStream, ProviderError>;

    /// Usage statistics accumulated so far.
    async fn stats(&self) -> Result<SessionStats, ProviderError>;

    /// Release the session.
    async fn close(&mut self) -> Result<(), ProviderError>;
}

/// Factory port for reasoning sessions.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    async fn open(
        &self,
        request: SessionRequest,
    ) -> Result<Box<dyn ReasoningSession>, ProviderError>;
}
