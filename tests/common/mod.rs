//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files: an in-memory store, a scripted
//! reasoning provider, and polling helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use sqlx::SqlitePool;

use drover::application::BotScheduler;
use drover::domain::models::{Config, Skill};
use drover::domain::ports::{
    CatalogError, ChunkKind, ChunkStream, ProviderError, ReasoningProvider, ReasoningSession,
    SendOptions, SessionRequest, SessionStats, SkillCatalog, StreamChunk,
};
use drover::infrastructure::database::{connect, SqliteBotRepository};

/// Create a fresh in-memory database with the schema applied.
pub async fn setup_test_db() -> SqlitePool {
    connect("sqlite::memory:")
        .await
        .expect("failed to create test database")
}

/// Close the pool at the end of a test.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}

/// Poll a condition every 50ms until it holds or the timeout passes.
pub async fn wait_until<F, Fut>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = std::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if predicate().await {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// One scripted response to a `send` call.
pub enum SendScript {
    /// Stream these chunks, then end.
    Chunks(Vec<StreamChunk>),
    /// Fail the send with this message.
    Error(String),
}

/// One scripted session handed out by `ScriptedProvider::open`.
pub struct ScriptedSession {
    /// Fail the open itself with this message.
    pub open_error: Option<String>,
    /// Responses consumed one per `send`, in order. An exhausted
    /// session streams nothing (a blank response).
    pub sends: Vec<SendScript>,
}

/// A single text response.
pub fn text(content: &str) -> SendScript {
    SendScript::Chunks(vec![StreamChunk::new(ChunkKind::Text, content)])
}

/// A blank response.
pub fn blank() -> SendScript {
    SendScript::Chunks(Vec::new())
}

/// A structured plan block the strict parser accepts.
pub fn plan_text(goal: &str, steps: &[&str]) -> String {
    let mut out = format!("<plan>\n<goal>{}</goal>\n", goal);
    for step in steps {
        out.push_str(&format!("<step>{}</step>\n", step));
    }
    out.push_str("</plan>");
    out
}

pub fn session(sends: Vec<SendScript>) -> ScriptedSession {
    ScriptedSession {
        open_error: None,
        sends,
    }
}

pub fn failing_session(message: &str) -> ScriptedSession {
    ScriptedSession {
        open_error: Some(message.to_string()),
        sends: Vec::new(),
    }
}

/// Reasoning provider that hands out scripted sessions in order. Once
/// the script runs dry, opens succeed and every send streams nothing,
/// so unscripted cycles degrade to empty responses instead of panics.
pub struct ScriptedProvider {
    sessions: Mutex<VecDeque<ScriptedSession>>,
}

impl ScriptedProvider {
    pub fn new(sessions: Vec<ScriptedSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    async fn open(
        &self,
        _request: SessionRequest,
    ) -> Result<Box<dyn ReasoningSession>, ProviderError> {
        let scripted = self
            .sessions
            .lock()
            .expect("script lock poisoned")
            .pop_front();

        match scripted {
            Some(ScriptedSession {
                open_error: Some(message),
                ..
            }) => Err(ProviderError::SessionCreate(message)),
            Some(ScriptedSession { sends, .. }) => Ok(Box::new(LiveScriptedSession {
                sends: sends.into(),
            })),
            None => Ok(Box::new(LiveScriptedSession {
                sends: VecDeque::new(),
            })),
        }
    }
}

struct LiveScriptedSession {
    sends: VecDeque<SendScript>,
}

#[async_trait]
impl ReasoningSession for LiveScriptedSession {
    async fn send(&mut self, _text: &str, _opts: SendOptions) -> Result<ChunkStream, ProviderError> {
        match self.sends.pop_front() {
            Some(SendScript::Chunks(chunks)) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<_, ProviderError>),
            ))),
            Some(SendScript::Error(message)) => Err(ProviderError::Request(message)),
            None => Ok(Box::pin(stream::empty::<Result<StreamChunk, ProviderError>>())),
        }
    }

    async fn stats(&self) -> Result<SessionStats, ProviderError> {
        Ok(SessionStats::default())
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Fixed skill catalog.
pub struct StaticCatalog {
    skills: Vec<Skill>,
}

impl StaticCatalog {
    pub fn empty() -> Self {
        Self { skills: Vec::new() }
    }

    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }
}

#[async_trait]
impl SkillCatalog for StaticCatalog {
    async fn load_all(&self) -> Result<Vec<Skill>, CatalogError> {
        Ok(self.skills.clone())
    }
}

/// Config suitable for tests: no file logging, fast ticks.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.engine.file_logging = false;
    config.engine.tick_interval_secs = 1;
    config.engine.initial_tick_delay_secs = 1;
    config
}

/// Build a scheduler over a fresh in-memory store and the given
/// provider script. Returns the scheduler, the repository, and the
/// pool (close it at the end of the test).
pub async fn make_scheduler(
    sessions: Vec<ScriptedSession>,
) -> (Arc<BotScheduler>, Arc<SqliteBotRepository>, SqlitePool) {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteBotRepository::new(pool.clone()));
    let provider = Arc::new(ScriptedProvider::new(sessions));
    let catalog = Arc::new(StaticCatalog::empty());
    let scheduler = BotScheduler::new(
        store.clone(),
        provider,
        catalog,
        Arc::new(test_config()),
    );
    (scheduler, store, pool)
}
