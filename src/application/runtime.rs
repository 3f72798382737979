//! Per-bot runtime handle.
//!
//! Created when a bot starts, destroyed when its loop terminates. The
//! handle bundles the cancellation signal, the pending-input queue, and
//! the live log sink shared with the run logger.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::models::RunLogEntry;
use crate::services::run_logger::LiveRunSink;

/// Capacity of the live log broadcast queue per bot.
const LIVE_LOG_CAPACITY: usize = 256;

/// In-memory state for one currently-running bot.
pub struct BotRuntime {
    pub bot_id: Uuid,
    /// Cooperative cancellation signal, observed at loop top, in the
    /// inter-cycle sleep, and at each streamed-chunk read.
    pub cancel: CancellationToken,
    /// Live log destinations (subscriber queue + optional run file).
    pub sink: LiveRunSink,
    input_tx: mpsc::UnboundedSender<String>,
    input_rx: Mutex<mpsc::UnboundedReceiver<String>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl BotRuntime {
    pub fn new(bot_id: Uuid) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Self {
            bot_id,
            cancel: CancellationToken::new(),
            sink: LiveRunSink::new(LIVE_LOG_CAPACITY),
            input_tx,
            input_rx: Mutex::new(input_rx),
            join: Mutex::new(None),
        }
    }

    /// Queue a user message for the next cycle's drain. Multi-writer.
    pub fn enqueue_input(&self, text: impl Into<String>) {
        // Receiver lives as long as the handle, so send cannot fail in
        // practice; a closed channel just drops the message.
        let _ = self.input_tx.send(text.into());
    }

    /// Drain all currently-queued user messages in FIFO order.
    /// Single-reader: only the owning cycle calls this.
    pub fn drain_inputs(&self) -> Vec<String> {
        let mut rx = self.input_rx.lock().expect("input queue lock poisoned");
        let mut drained = Vec::new();
        while let Ok(text) = rx.try_recv() {
            drained.push(text);
        }
        drained
    }

    /// Subscribe to log entries emitted while this bot runs.
    pub fn subscribe_logs(&self) -> tokio::sync::broadcast::Receiver<RunLogEntry> {
        self.sink.subscribe()
    }

    /// Attach the loop's join handle after spawning.
    pub fn set_join(&self, handle: JoinHandle<()>) {
        *self.join.lock().expect("join lock poisoned") = Some(handle);
    }

    /// Take the loop's join handle, if still attached.
    pub fn take_join(&self) -> Option<JoinHandle<()>> {
        self.join.lock().expect("join lock poisoned").take()
    }
}
