//! Run log fan-out sink.
//!
//! Every emission reaches four destinations: the durable store, the
//! bot's live-subscriber queue, an optional per-run file, and the
//! engine event bus. A failure in any one destination is downgraded to
//! a diagnostic and never interrupts the cycle that logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::models::{LogLevel, RunLogEntry};
use crate::domain::ports::BotRepository;
use crate::services::event_bus::{EngineEvent, EventBus};

/// Live destinations for one running bot: the subscriber queue and the
/// per-run file, when open.
#[derive(Clone)]
pub struct LiveRunSink {
    pub log_tx: broadcast::Sender<RunLogEntry>,
    pub file: Arc<tokio::sync::Mutex<Option<tokio::fs::File>>>,
}

impl LiveRunSink {
    pub fn new(capacity: usize) -> Self {
        let (log_tx, _) = broadcast::channel(capacity);
        Self {
            log_tx,
            file: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Subscribe to entries emitted while this bot runs.
    pub fn subscribe(&self) -> broadcast::Receiver<RunLogEntry> {
        self.log_tx.subscribe()
    }

    /// Append a raw line to the per-run file, if one is open. I/O
    /// errors are swallowed; file logging is best effort.
    pub async fn write_file_line(&self, line: &str) {
        let mut guard = self.file.lock().await;
        if let Some(file) = guard.as_mut() {
            let _ = file.write_all(line.as_bytes()).await;
            let _ = file.write_all(b"\n").await;
            let _ = file.flush().await;
        }
    }

    /// Close the per-run file, if open.
    pub async fn close_file(&self) {
        let mut guard = self.file.lock().await;
        if let Some(mut file) = guard.take() {
            let _ = file.flush().await;
        }
    }
}

/// The fan-out sink.
pub struct RunLogger {
    store: Arc<dyn BotRepository>,
    events: EventBus,
    live: Mutex<HashMap<Uuid, LiveRunSink>>,
}

impl RunLogger {
    pub fn new(store: Arc<dyn BotRepository>, events: EventBus) -> Self {
        Self {
            store,
            events,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Register the live sink for a bot that just started.
    pub fn register(&self, bot_id: Uuid, sink: LiveRunSink) {
        self.live
            .lock()
            .expect("run logger lock poisoned")
            .insert(bot_id, sink);
    }

    /// Remove the live sink for a bot that stopped. Idempotent.
    pub fn unregister(&self, bot_id: Uuid) {
        self.live
            .lock()
            .expect("run logger lock poisoned")
            .remove(&bot_id);
    }

    /// The live sink for a bot, when it is running.
    pub fn sink_for(&self, bot_id: Uuid) -> Option<LiveRunSink> {
        self.live
            .lock()
            .expect("run logger lock poisoned")
            .get(&bot_id)
            .cloned()
    }

    /// Emit one entry to all destinations.
    pub async fn log(
        &self,
        bot_id: Uuid,
        run_number: i64,
        level: LogLevel,
        message: impl Into<String>,
        detail: Option<String>,
    ) {
        let mut entry = RunLogEntry::new(bot_id, run_number, level, message);
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.emit(entry).await;
    }

    /// Emit a prebuilt entry to all destinations.
    pub async fn emit(&self, entry: RunLogEntry) {
        if let Err(err) = self.store.append_log(&entry).await {
            tracing::warn!(bot_id = %entry.bot_id, "failed to persist run log entry: {}", err);
        }

        if let Some(sink) = self.sink_for(entry.bot_id) {
            // Non-blocking: lagging subscribers lose entries.
            let _ = sink.log_tx.send(entry.clone());
            sink.write_file_line(&format_entry(&entry)).await;
        }

        self.events.publish(EngineEvent::LogEntryAdded(entry));
    }
}

/// Render one entry as a per-run file line: timestamp, padded level,
/// message, then detail lines indented beneath.
pub fn format_entry(entry: &RunLogEntry) -> String {
    let mut line = format!(
        "[{}] {} {}",
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.level.padded(),
        entry.message
    );
    if let Some(detail) = &entry.detail {
        for detail_line in detail.lines() {
            line.push_str("\n    ");
            line.push_str(detail_line);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_entry_single_line() {
        let mut entry = RunLogEntry::new(Uuid::new_v4(), 1, LogLevel::Info, "hello");
        entry.created_at = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let line = format_entry(&entry);
        assert_eq!(line, "[2025-06-01 12:00:00] INFO          hello");
    }

    #[test]
    fn test_format_entry_indents_detail() {
        let entry = RunLogEntry::new(Uuid::new_v4(), 1, LogLevel::Error, "boom")
            .with_detail("line one\nline two");
        let line = format_entry(&entry);
        let mut lines = line.lines();
        assert!(lines.next().unwrap().ends_with("boom"));
        assert_eq!(lines.next().unwrap(), "    line one");
        assert_eq!(lines.next().unwrap(), "    line two");
    }
}
