//! Runtime registry and scheduler.
//!
//! The public control surface for bots: start, stop, send input, plus
//! the periodic tick that discovers due bots and the per-bot loop that
//! drives execution cycles. One detached task per running bot; bots
//! are fully independent of one another, and a single bot's failure
//! never reaches the scheduler.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::cycle::CycleExecutor;
use crate::application::registry::RuntimeRegistry;
use crate::application::runtime::BotRuntime;
use crate::domain::models::{BotStatus, Config, LogLevel};
use crate::domain::ports::{BotRepository, ReasoningProvider, SkillCatalog};
use crate::services::event_bus::{EngineEvent, EventBus};
use crate::services::run_logger::RunLogger;
use crate::services::schedule_policy;

/// Top-level bot scheduler.
pub struct BotScheduler {
    store: Arc<dyn BotRepository>,
    registry: Arc<RuntimeRegistry>,
    logger: Arc<RunLogger>,
    events: EventBus,
    executor: Arc<CycleExecutor>,
    config: Arc<Config>,
    shutdown: CancellationToken,
}

impl BotScheduler {
    pub fn new(
        store: Arc<dyn BotRepository>,
        provider: Arc<dyn ReasoningProvider>,
        catalog: Arc<dyn SkillCatalog>,
        config: Arc<Config>,
    ) -> Arc<Self> {
        let events = EventBus::default();
        let registry = Arc::new(RuntimeRegistry::new());
        let logger = Arc::new(RunLogger::new(Arc::clone(&store), events.clone()));
        let executor = Arc::new(CycleExecutor::new(
            Arc::clone(&store),
            provider,
            catalog,
            Arc::clone(&logger),
            events.clone(),
            Arc::clone(&registry),
            Arc::clone(&config),
        ));

        Arc::new(Self {
            store,
            registry,
            logger,
            events,
            executor,
            config,
            shutdown: CancellationToken::new(),
        })
    }

    /// Subscribe to status/plan/log events.
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The fan-out run logger (for UI-side subscriptions).
    pub fn logger(&self) -> &Arc<RunLogger> {
        &self.logger
    }

    /// Spawn the periodic discovery tick: after a short initial delay,
    /// list runnable bots and start any that are not already live.
    pub fn spawn_tick_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = Duration::from_secs(self.config.engine.initial_tick_delay_secs);
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = tokio::time::sleep(initial) => {}
            }

            let period = Duration::from_secs(self.config.engine.tick_interval_secs.max(1));
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = ticker.tick() => self.tick().await,
                }
            }
        })
    }

    /// One discovery pass. Registry membership is the sole
    /// de-duplication against bots that are already live.
    async fn tick(&self) {
        let runnable = match self.store.list_runnable(Utc::now()).await {
            Ok(bots) => bots,
            Err(err) => {
                tracing::warn!("scheduler tick failed to list runnable bots: {}", err);
                return;
            }
        };

        for bot in runnable {
            if self.registry.contains(bot.id) {
                continue;
            }
            tracing::debug!(bot_id = %bot.id, name = %bot.name, "tick starting due bot");
            if let Err(err) = self.start(bot.id).await {
                tracing::warn!(bot_id = %bot.id, "tick failed to start bot: {}", err);
            }
        }
    }

    /// Start a bot's runtime loop. No-op with a warning when the bot
    /// is already running or no longer exists. Fire-and-forget: the
    /// loop is spawned detached and cleans up after itself.
    pub async fn start(&self, id: Uuid) -> Result<()> {
        if self.registry.contains(id) {
            tracing::warn!(bot_id = %id, "start ignored: bot is already running");
            return Ok(());
        }
        let Some(mut bot) = self.store.get(id).await? else {
            tracing::warn!(bot_id = %id, "start ignored: bot does not exist");
            return Ok(());
        };

        let now = Utc::now();
        bot.status = BotStatus::Running;
        bot.next_run_at = Some(now);
        bot.updated_at = now;
        self.store.update(&bot).await?;
        self.events.publish(EngineEvent::StatusChanged(bot.clone()));

        let runtime = Arc::new(BotRuntime::new(id));
        if !self.registry.insert_if_absent(Arc::clone(&runtime)) {
            // Lost a race with another starter; their loop owns the bot.
            tracing::warn!(bot_id = %id, "start ignored: bot is already running");
            return Ok(());
        }
        self.logger.register(id, runtime.sink.clone());

        let handle = tokio::spawn(run_bot_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.executor),
            Arc::clone(&self.registry),
            Arc::clone(&self.logger),
            self.events.clone(),
            Arc::clone(&runtime),
        ));
        runtime.set_join(handle);

        tracing::info!(bot_id = %id, name = %bot.name, "bot started");
        Ok(())
    }

    /// Stop a bot: signal cancellation, await the loop, and mark the
    /// record Stopped. Safe to call on a bot that is not running; the
    /// record update still happens.
    pub async fn stop(&self, id: Uuid) -> Result<()> {
        if let Some(runtime) = self.registry.remove(id) {
            runtime.cancel.cancel();
            if let Some(join) = runtime.take_join() {
                // Wait for the loop to acknowledge cancellation.
                let _ = join.await;
            }
            self.logger.unregister(id);
        }

        if let Some(mut bot) = self.store.get(id).await? {
            bot.status = BotStatus::Stopped;
            bot.pending_question = None;
            bot.next_run_at = None;
            bot.updated_at = Utc::now();
            self.store.update(&bot).await?;
            self.events.publish(EngineEvent::StatusChanged(bot));
        }

        tracing::info!(bot_id = %id, "bot stopped");
        Ok(())
    }

    /// Stop every running bot, sequentially over a snapshot of ids.
    pub async fn stop_all(&self) -> Result<()> {
        for id in self.registry.ids() {
            self.stop(id).await?;
        }
        Ok(())
    }

    /// Stop and restart every running bot.
    pub async fn restart_all(&self) -> Result<()> {
        let ids = self.registry.ids();
        for id in &ids {
            self.stop(*id).await?;
        }
        for id in ids {
            self.start(id).await?;
        }
        Ok(())
    }

    /// Queue user input for a bot. The text is always recorded as a
    /// user-response log entry so it is never silently lost, and is
    /// handed to the runtime queue when the bot is live.
    pub async fn send_input(&self, id: Uuid, text: &str) -> Result<()> {
        let run = self
            .store
            .get(id)
            .await?
            .map(|bot| bot.run_count)
            .unwrap_or(0);
        self.logger
            .log(id, run, LogLevel::UserResponse, text, None)
            .await;

        if let Some(runtime) = self.registry.get(id) {
            runtime.enqueue_input(text);
        }
        Ok(())
    }

    /// Whether a bot currently has a live runtime loop.
    pub fn is_running(&self, id: Uuid) -> bool {
        self.registry.contains(id)
    }

    /// Snapshot of the bots with live runtime loops.
    pub fn running_ids(&self) -> Vec<Uuid> {
        self.registry.ids()
    }

    /// Cancel the tick loop. Running bots are unaffected; use
    /// `stop_all` for those.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// The per-bot loop: sleep until due, run one cycle, re-check the
/// record, repeat. Terminates on cancellation, record deletion, a
/// terminal status, or an unset next run time, and always removes its
/// own registry entry on the way out.
async fn run_bot_loop(
    store: Arc<dyn BotRepository>,
    executor: Arc<CycleExecutor>,
    registry: Arc<RuntimeRegistry>,
    logger: Arc<RunLogger>,
    events: EventBus,
    runtime: Arc<BotRuntime>,
) {
    let id = runtime.bot_id;
    let cancel = runtime.cancel.clone();

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let bot = match store.get(id).await {
            Ok(Some(bot)) => bot,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(bot_id = %id, "failed to reload bot record: {}", err);
                break;
            }
        };

        if let Some(at) = bot.next_run_at {
            let now = Utc::now();
            if at > now {
                // Fire a status notification before suspending so
                // observers see the waiting state and target time.
                events.publish(EngineEvent::StatusChanged(bot.clone()));
                let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        if let Err(err) = executor.run_cycle(id, cancel.clone()).await {
            handle_cycle_failure(store.as_ref(), &logger, &events, id, &err).await;
        }

        match store.get(id).await {
            Ok(Some(bot)) => {
                let terminal = matches!(bot.status, BotStatus::Completed | BotStatus::Stopped);
                if terminal || bot.next_run_at.is_none() {
                    break;
                }
            }
            _ => break,
        }
    }

    // Idempotent with an explicit stop().
    registry.remove(id);
    logger.unregister(id);
    tracing::debug!(bot_id = %id, "bot loop terminated");
}

/// Convert an uncaught cycle error into persisted retry guidance and a
/// kind-specific backoff. Never fatal to the scheduler.
async fn handle_cycle_failure(
    store: &dyn BotRepository,
    logger: &RunLogger,
    events: &EventBus,
    id: Uuid,
    err: &anyhow::Error,
) {
    let message = format!("{:#}", err);
    tracing::error!(bot_id = %id, "cycle failed: {}", message);

    let mut bot = match store.get(id).await {
        Ok(Some(bot)) => bot,
        Ok(None) => return,
        Err(store_err) => {
            tracing::error!(bot_id = %id, "failed to reload bot after cycle failure: {}", store_err);
            return;
        }
    };

    bot.last_error = Some(message.clone());
    bot.retry_guidance = Some(format!(
        "The previous run failed with: {}. Adjust the approach to avoid repeating this failure.",
        message
    ));
    let now = Utc::now();
    schedule_policy::compute_retry_run(&mut bot, now);
    bot.updated_at = now;

    if let Err(store_err) = store.update(&bot).await {
        tracing::error!(bot_id = %id, "failed to persist cycle failure: {}", store_err);
        return;
    }

    let run = bot.run_count;
    logger
        .log(
            id,
            run,
            LogLevel::Error,
            format!("Run {} failed: {}", run, message),
            None,
        )
        .await;
    logger
        .log(
            id,
            run,
            LogLevel::Info,
            "The run will be retried; send guidance with `bot send` or halt it with `bot stop`",
            None,
        )
        .await;
    events.publish(EngineEvent::StatusChanged(bot));
}
