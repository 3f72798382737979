//! Execution cycle.
//!
//! One call advances a bot by exactly one scheduled occurrence: drain
//! queued user input, resolve skills, resolve a plan (overrides win,
//! then generation, then the direct no-plan fallback), execute steps,
//! synthesize, reschedule.
//! Provider failures are retried up to three times at each call site
//! with session recreation between attempts; anything that still
//! escapes is handled by the owning loop, never here.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::registry::RuntimeRegistry;
use crate::domain::models::{Bot, BotStatus, Config, LogLevel, Plan, Skill, StepStatus};
use crate::domain::ports::{
    BotRepository, ChunkKind, ChunkStream, ProviderError, ReasoningProvider, ReasoningSession,
    SendOptions, SessionRequest, SkillCatalog, ThinkLevel,
};
use crate::services::event_bus::{EngineEvent, EventBus};
use crate::services::run_logger::RunLogger;
use crate::services::{plan_parser, prompts, schedule_policy};

/// Attempts per retryable call site (plan generation, direct
/// execution, each step, synthesis).
const MAX_ATTEMPTS: u32 = 3;

const PLANNING_TEMPERATURE: f32 = 0.2;
const PLANNING_MAX_TOKENS: u32 = 1024;
const SYNTHESIS_TEMPERATURE: f32 = 0.5;
const SYNTHESIS_MAX_TOKENS: u32 = 2048;

/// Marker: the cycle was interrupted by cooperative cancellation.
/// Distinct from failure; the cycle tail still runs and forces Stopped.
struct Cancelled;

/// Failure of one provider attempt.
enum AttemptError {
    Cancelled,
    Provider(ProviderError),
}

/// Accumulated output of one streamed response.
struct Collected {
    text: String,
    tool_calls: u32,
}

/// Runs execution cycles for bots.
pub struct CycleExecutor {
    store: Arc<dyn BotRepository>,
    provider: Arc<dyn ReasoningProvider>,
    catalog: Arc<dyn SkillCatalog>,
    logger: Arc<RunLogger>,
    events: EventBus,
    registry: Arc<RuntimeRegistry>,
    config: Arc<Config>,
}

impl CycleExecutor {
    pub fn new(
        store: Arc<dyn BotRepository>,
        provider: Arc<dyn ReasoningProvider>,
        catalog: Arc<dyn SkillCatalog>,
        logger: Arc<RunLogger>,
        events: EventBus,
        registry: Arc<RuntimeRegistry>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            provider,
            catalog,
            logger,
            events,
            registry,
            config,
        }
    }

    /// Run one cycle for a bot. An `Err` here is cycle-fatal and is
    /// routed to the failure handler by the owning loop.
    pub async fn run_cycle(&self, bot_id: Uuid, cancel: CancellationToken) -> Result<()> {
        let Some(mut bot) = self.store.get(bot_id).await? else {
            // Deleted concurrently; nothing to do.
            return Ok(());
        };

        let inputs = self
            .registry
            .get(bot_id)
            .map(|rt| rt.drain_inputs())
            .unwrap_or_default();

        // Persist the attempt before doing any work, so a crash
        // mid-cycle still shows it happened.
        bot.run_count += 1;
        bot.last_run_at = Some(Utc::now());
        bot.updated_at = Utc::now();
        self.store.update(&bot).await?;
        let run = bot.run_count;

        self.open_run_file(&bot, run).await;

        let result = self.run_phases(&bot, run, &inputs, &cancel).await;

        // Close the per-run file on every exit path.
        if let Some(sink) = self.logger.sink_for(bot_id) {
            sink.write_file_line(&format!(
                "==== run {} closed at {} ====",
                run,
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            ))
            .await;
            sink.close_file().await;
        }

        result
    }

    /// Steps 4 through 8 of the cycle, separated so the caller can
    /// always run the file-closing tail.
    async fn run_phases(
        &self,
        bot: &Bot,
        run: i64,
        inputs: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.emit_run_start(bot, run, inputs).await;

        let (skills, tool_groups) = self.resolve_skills(bot, run).await?;

        if !cancel.is_cancelled() {
            match self.resolve_plan(bot, run, inputs, &skills, &tool_groups, cancel).await {
                Ok(Some(mut plan)) => {
                    let results = self
                        .execute_steps(bot, run, &mut plan, &skills, &tool_groups, cancel)
                        .await?;
                    if !results.is_empty() && !cancel.is_cancelled() {
                        self.synthesize_with_retry(bot, run, &results, cancel).await;
                    }
                }
                // Direct execution already ran (or was exhausted);
                // step/synthesis phases are skipped this cycle.
                Ok(None) => {}
                Err(Cancelled) => {}
            }
        }

        self.finalize(bot.id, run, cancel).await
    }

    async fn emit_run_start(&self, bot: &Bot, run: i64, inputs: &[String]) {
        let mut detail = String::new();
        if !inputs.is_empty() {
            detail.push_str("User instructions:\n");
            detail.push_str(&inputs.join("\n"));
        }
        if let Some(guidance) = &bot.retry_guidance {
            if !detail.is_empty() {
                detail.push('\n');
            }
            detail.push_str("Retry guidance: ");
            detail.push_str(guidance);
        }

        self.logger
            .log(
                bot.id,
                run,
                LogLevel::RunStart,
                format!("Run {} started: {}", run, bot.goal),
                (!detail.is_empty()).then_some(detail),
            )
            .await;
    }

    /// Load the catalog, select the bot's enabled skills (all when none
    /// are explicitly enabled), and take tool groups from settings.
    async fn resolve_skills(&self, bot: &Bot, run: i64) -> Result<(Vec<Skill>, Vec<String>)> {
        let all = self
            .catalog
            .load_all()
            .await
            .context("failed to load skill catalog")?;

        let skills: Vec<Skill> = if bot.skill_ids.is_empty() {
            all
        } else {
            all.into_iter()
                .filter(|s| bot.skill_ids.contains(&s.id))
                .collect()
        };
        let tool_groups = self.config.tools.enabled_groups.clone();

        self.logger
            .log(
                bot.id,
                run,
                LogLevel::Info,
                format!(
                    "Resolved {} skill(s) and {} tool group(s)",
                    skills.len(),
                    tool_groups.len()
                ),
                None,
            )
            .await;

        Ok((skills, tool_groups))
    }

    /// Plan resolution in priority order: durable step overrides win,
    /// then generation with retry, then the direct no-plan fallback.
    /// `Ok(None)` means the direct path handled this cycle.
    async fn resolve_plan(
        &self,
        bot: &Bot,
        run: i64,
        inputs: &[String],
        skills: &[Skill],
        tool_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<Option<Plan>, Cancelled> {
        let overrides = match self.store.get_step_overrides(bot.id).await {
            Ok(o) => o,
            Err(err) => {
                tracing::warn!(bot_id = %bot.id, "failed to load step overrides: {}", err);
                Vec::new()
            }
        };

        if !overrides.is_empty() {
            self.logger
                .log(
                    bot.id,
                    run,
                    LogLevel::Info,
                    format!("Using {} user-defined step(s)", overrides.len()),
                    None,
                )
                .await;
            let plan = Plan::from_overrides(bot.goal.clone(), &overrides);
            self.publish_plan(bot.id, &plan);
            return Ok(Some(plan));
        }

        if let Some(plan) = self.generate_plan_with_retry(bot, run, inputs, cancel).await? {
            self.publish_plan(bot.id, &plan);
            return Ok(Some(plan));
        }

        self.logger
            .log(
                bot.id,
                run,
                LogLevel::Warning,
                "No plan could be produced; falling back to direct execution",
                None,
            )
            .await;
        self.direct_execution(bot, run, skills, tool_groups, cancel).await?;
        Ok(None)
    }

    /// Plan generation, up to three attempts with a fresh planning
    /// session each. Blank output and provider errors are retried; on
    /// exhaustion this degrades to `None` rather than failing the cycle.
    async fn generate_plan_with_retry(
        &self,
        bot: &Bot,
        run: i64,
        inputs: &[String],
        cancel: &CancellationToken,
    ) -> Result<Option<Plan>, Cancelled> {
        let system = prompts::planning_prompt(bot, inputs, bot.retry_guidance.as_deref());

        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            match self.planning_attempt(bot, run, &system, cancel).await {
                Ok(text) if text.trim().is_empty() => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        "Plan generation returned an empty response",
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return Ok(None);
                    }
                }
                Ok(text) => {
                    let detail = self
                        .config
                        .engine
                        .log_inference_output
                        .then(|| text.clone());
                    self.logger
                        .log(bot.id, run, LogLevel::Debug, "Plan generation produced output", detail)
                        .await;

                    let plan = plan_parser::parse(&text)
                        .or_else(|| plan_parser::parse_fallback(&text, &bot.goal));
                    return Ok(plan);
                }
                Err(AttemptError::Cancelled) => return Err(Cancelled),
                Err(AttemptError::Provider(err)) => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        &format!("Plan generation failed: {}", err),
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return Ok(None);
                    }
                }
            }
        }
        Ok(None)
    }

    async fn planning_attempt(
        &self,
        bot: &Bot,
        run: i64,
        system: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AttemptError> {
        let request = SessionRequest {
            model: self.model_for(bot),
            system_prompt: system.to_string(),
            think: self.think_level(),
            tool_groups: Vec::new(),
        };
        let mut session = self
            .provider
            .open(request)
            .await
            .map_err(AttemptError::Provider)?;

        let opts = SendOptions {
            temperature: PLANNING_TEMPERATURE,
            max_tokens: PLANNING_MAX_TOKENS,
            think: self.think_level(),
            ..SendOptions::default()
        };

        let result = match session.send(&bot.goal, opts).await {
            Ok(stream) => self
                .collect(bot.id, run, stream, cancel, false, true)
                .await
                .map(|c| c.text),
            Err(err) => Err(AttemptError::Provider(err)),
        };

        // Always close before the next attempt opens a new session.
        let _ = session.close().await;
        result
    }

    /// Direct execution: a single unplanned pass over the goal, used
    /// only when no plan could be produced. Absorbs its own failures.
    async fn direct_execution(
        &self,
        bot: &Bot,
        run: i64,
        skills: &[Skill],
        tool_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let system = prompts::execution_prompt(bot, skills, tool_groups);

        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let request = SessionRequest {
                model: self.model_for(bot),
                system_prompt: system.clone(),
                think: self.think_level(),
                tool_groups: tool_groups.to_vec(),
            };
            let attempt_result = match self.provider.open(request).await {
                Ok(mut session) => {
                    let opts = SendOptions {
                        temperature: bot.temperature,
                        max_tokens: bot.max_tokens,
                        think: self.think_level(),
                        ..SendOptions::default()
                    };
                    let result = match session.send(&bot.goal, opts).await {
                        Ok(stream) => self
                            .collect(bot.id, run, stream, cancel, true, true)
                            .await
                            .map(|c| c.text),
                        Err(err) => Err(AttemptError::Provider(err)),
                    };
                    let _ = session.close().await;
                    result
                }
                Err(err) => Err(AttemptError::Provider(err)),
            };

            match attempt_result {
                Ok(text) if text.trim().is_empty() => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        "Direct execution returned an empty response",
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return Ok(());
                    }
                }
                Ok(text) => {
                    self.logger
                        .log(
                            bot.id,
                            run,
                            LogLevel::Info,
                            "Direct execution produced a result",
                            Some(text.trim().to_string()),
                        )
                        .await;
                    return Ok(());
                }
                Err(AttemptError::Cancelled) => return Err(Cancelled),
                Err(AttemptError::Provider(err)) => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        &format!("Direct execution failed: {}", err),
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Execute every plan step in order over one shared session.
    ///
    /// The session is recreated only when a step attempt fails and
    /// another attempt follows. Returns the running results list used
    /// by synthesis. Failure to open the initial session is cycle-fatal.
    async fn execute_steps(
        &self,
        bot: &Bot,
        run: i64,
        plan: &mut Plan,
        skills: &[Skill],
        tool_groups: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let request = SessionRequest {
            model: self.model_for(bot),
            system_prompt: prompts::execution_prompt(bot, skills, tool_groups),
            think: self.think_level(),
            tool_groups: tool_groups.to_vec(),
        };
        let mut session: Box<dyn ReasoningSession> = self
            .provider
            .open(request.clone())
            .await
            .context("failed to open execution session")?;

        let mut results: Vec<String> = Vec::new();
        let mut cancelled = false;

        for idx in 0..plan.steps.len() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            plan.steps[idx].status = StepStatus::Running;
            self.publish_plan(bot.id, plan);

            let number = plan.steps[idx].number;
            self.logger
                .log(
                    bot.id,
                    run,
                    LogLevel::StepStart,
                    format!("Step {}: {}", number, plan.steps[idx].description),
                    None,
                )
                .await;

            let message = prompts::step_message(&plan.goal, &results, &plan.steps[idx]);

            let mut outcome: Option<(String, u32)> = None;
            let mut last_error = String::new();

            for attempt in 1..=MAX_ATTEMPTS {
                if attempt > 1 {
                    // Close the failed session and open a fresh one
                    // before retrying.
                    let _ = session.close().await;
                    session = match self.provider.open(request.clone()).await {
                        Ok(s) => s,
                        Err(err) => {
                            last_error = err.to_string();
                            self.attempt_exhaust_log(
                                bot.id,
                                run,
                                attempt,
                                &format!("Step {} session reopen failed: {}", number, err),
                            )
                            .await;
                            continue;
                        }
                    };
                }

                let attempt_result = match session
                    .send(
                        &message,
                        SendOptions {
                            temperature: bot.temperature,
                            max_tokens: bot.max_tokens,
                            think: self.think_level(),
                            ..SendOptions::default()
                        },
                    )
                    .await
                {
                    Ok(stream) => self.collect(bot.id, run, stream, cancel, true, true).await,
                    Err(err) => Err(AttemptError::Provider(err)),
                };

                match attempt_result {
                    Ok(collected) if collected.text.trim().is_empty() => {
                        last_error = "empty response from provider".to_string();
                        self.attempt_exhaust_log(
                            bot.id,
                            run,
                            attempt,
                            &format!("Step {} returned an empty response", number),
                        )
                        .await;
                    }
                    Ok(collected) => {
                        outcome = Some((collected.text.trim().to_string(), collected.tool_calls));
                        break;
                    }
                    Err(AttemptError::Cancelled) => {
                        cancelled = true;
                        break;
                    }
                    Err(AttemptError::Provider(err)) => {
                        last_error = err.to_string();
                        self.attempt_exhaust_log(
                            bot.id,
                            run,
                            attempt,
                            &format!("Step {} failed: {}", number, err),
                        )
                        .await;
                    }
                }
            }

            if cancelled {
                break;
            }

            match outcome {
                Some((text, tool_calls)) => {
                    plan.steps[idx].status = StepStatus::Complete;
                    plan.steps[idx].result = Some(text.clone());
                    results.push(format!("Step {}: {}", number, text));

                    let message = if tool_calls > 0 {
                        format!("Step {} complete ({} tool call(s))", number, tool_calls)
                    } else {
                        format!("Step {} complete", number)
                    };
                    let detail = self.config.engine.log_inference_output.then_some(text);
                    self.logger
                        .log(bot.id, run, LogLevel::StepComplete, message, detail)
                        .await;
                }
                None => {
                    plan.steps[idx].status = StepStatus::Failed;
                    plan.steps[idx].error = Some(last_error.clone());
                    results.push(format!("Step {} failed: {}", number, last_error));
                }
            }
            self.publish_plan(bot.id, plan);
        }

        // The shared session is always closed, whatever happened above.
        if let Ok(stats) = session.stats().await {
            self.logger
                .log(
                    bot.id,
                    run,
                    LogLevel::Debug,
                    format!(
                        "Execution session used {} token(s) in {} ms ({:.1} tok/s)",
                        stats.token_count, stats.compute_time_ms, stats.tokens_per_second
                    ),
                    None,
                )
                .await;
        }
        let _ = session.close().await;

        Ok(results)
    }

    /// Synthesis: summarize the step results. Failure here is logged
    /// but never fails the cycle.
    async fn synthesize_with_retry(
        &self,
        bot: &Bot,
        run: i64,
        results: &[String],
        cancel: &CancellationToken,
    ) {
        let system = prompts::synthesis_prompt(bot);
        let message = prompts::synthesis_message(&bot.goal, results);

        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return;
            }

            let request = SessionRequest {
                model: self.model_for(bot),
                system_prompt: system.clone(),
                think: ThinkLevel::Off,
                tool_groups: Vec::new(),
            };
            let attempt_result = match self.provider.open(request).await {
                Ok(mut session) => {
                    let opts = SendOptions {
                        temperature: SYNTHESIS_TEMPERATURE,
                        max_tokens: SYNTHESIS_MAX_TOKENS,
                        ..SendOptions::default()
                    };
                    let result = match session.send(&message, opts).await {
                        Ok(stream) => self
                            .collect(bot.id, run, stream, cancel, false, false)
                            .await
                            .map(|c| c.text),
                        Err(err) => Err(AttemptError::Provider(err)),
                    };
                    let _ = session.close().await;
                    result
                }
                Err(err) => Err(AttemptError::Provider(err)),
            };

            match attempt_result {
                Ok(text) if text.trim().is_empty() => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        "Synthesis returned an empty response",
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return;
                    }
                }
                Ok(text) => {
                    self.logger
                        .log(bot.id, run, LogLevel::Info, text.trim().to_string(), None)
                        .await;
                    return;
                }
                Err(AttemptError::Cancelled) => return,
                Err(AttemptError::Provider(err)) => {
                    self.attempt_exhaust_log(
                        bot.id,
                        run,
                        attempt,
                        &format!("Synthesis failed: {}", err),
                    )
                    .await;
                    if attempt == MAX_ATTEMPTS {
                        return;
                    }
                }
            }
        }
    }

    /// Step 8: reschedule and persist the success-path outcome. A
    /// cancellation observed mid-cycle forces Stopped instead.
    async fn finalize(&self, bot_id: Uuid, run: i64, cancel: &CancellationToken) -> Result<()> {
        let Some(mut bot) = self.store.get(bot_id).await? else {
            return Ok(());
        };

        bot.retry_guidance = None;
        bot.last_error = None;
        let now = Utc::now();
        if cancel.is_cancelled() {
            bot.status = BotStatus::Stopped;
            bot.next_run_at = None;
        } else {
            schedule_policy::compute_next_run(&mut bot, now);
        }
        bot.updated_at = now;
        self.store.update(&bot).await?;

        let message = match bot.next_run_at {
            Some(at) => format!(
                "Run {} complete; next run at {}",
                run,
                at.format("%Y-%m-%d %H:%M:%S")
            ),
            None => format!("Run {} complete; no further runs scheduled", run),
        };
        self.logger.log(bot_id, run, LogLevel::Info, message, None).await;
        self.events.publish(EngineEvent::StatusChanged(bot));
        Ok(())
    }

    /// Pull chunks off a response stream, observing cancellation at
    /// every read. Tooling chunks become skill-action log entries when
    /// `forward_tooling` is set; text (and optionally tool content)
    /// accumulates into the result.
    async fn collect(
        &self,
        bot_id: Uuid,
        run: i64,
        mut stream: ChunkStream,
        cancel: &CancellationToken,
        forward_tooling: bool,
        accumulate_tool_content: bool,
    ) -> Result<Collected, AttemptError> {
        let mut text = String::new();
        let mut tool_calls = 0u32;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(AttemptError::Cancelled),
                item = stream.next() => item,
            };

            match next {
                None => break,
                Some(Ok(chunk)) => match chunk.kind {
                    ChunkKind::Text => text.push_str(&chunk.content),
                    ChunkKind::ToolContent => {
                        if accumulate_tool_content {
                            text.push_str(&chunk.content);
                        }
                    }
                    ChunkKind::Tooling => {
                        tool_calls += 1;
                        if forward_tooling {
                            self.logger
                                .log(bot_id, run, LogLevel::SkillAction, chunk.content, None)
                                .await;
                        }
                    }
                    ChunkKind::Other => {}
                },
                Some(Err(err)) => return Err(AttemptError::Provider(err)),
            }
        }

        Ok(Collected { text, tool_calls })
    }

    /// Log a retry warning, or an error when attempts are exhausted.
    async fn attempt_exhaust_log(&self, bot_id: Uuid, run: i64, attempt: u32, what: &str) {
        if attempt < MAX_ATTEMPTS {
            self.logger
                .log(
                    bot_id,
                    run,
                    LogLevel::Warning,
                    format!("{} (attempt {}/{})", what, attempt, MAX_ATTEMPTS),
                    None,
                )
                .await;
        } else {
            self.logger
                .log(
                    bot_id,
                    run,
                    LogLevel::Error,
                    format!("{} (attempt {}/{}; giving up)", what, attempt, MAX_ATTEMPTS),
                    None,
                )
                .await;
        }
    }

    /// Best-effort creation of the per-run log file with its header.
    async fn open_run_file(&self, bot: &Bot, run: i64) {
        if !self.config.engine.file_logging {
            return;
        }
        let Some(sink) = self.logger.sink_for(bot.id) else {
            return;
        };

        let dir = Path::new(&self.config.engine.run_log_dir);
        if let Err(err) = tokio::fs::create_dir_all(dir).await {
            self.logger
                .log(
                    bot.id,
                    run,
                    LogLevel::Warning,
                    format!("Could not create run log directory: {}", err),
                    None,
                )
                .await;
            return;
        }

        let filename = format!(
            "{}-run{:04}-{}.log",
            sanitize_name(&bot.name),
            run,
            Utc::now().format("%Y%m%d-%H%M%S")
        );

        match tokio::fs::File::create(dir.join(filename)).await {
            Ok(file) => {
                *sink.file.lock().await = Some(file);
                let header = format!(
                    "==== {} run {} ====\ngoal: {}\nschedule: {}\nskills: {}\ntool groups: {}\n",
                    bot.name,
                    run,
                    bot.goal,
                    bot.schedule.description(),
                    if bot.skill_ids.is_empty() {
                        "all".to_string()
                    } else {
                        bot.skill_ids.join(", ")
                    },
                    self.config.tools.enabled_groups.join(", ")
                );
                sink.write_file_line(&header).await;
            }
            Err(err) => {
                self.logger
                    .log(
                        bot.id,
                        run,
                        LogLevel::Warning,
                        format!("Could not open run log file: {}", err),
                        None,
                    )
                    .await;
            }
        }
    }

    fn publish_plan(&self, bot_id: Uuid, plan: &Plan) {
        self.events.publish(EngineEvent::PlanChanged {
            bot_id,
            plan: plan.clone(),
        });
    }

    fn model_for(&self, bot: &Bot) -> String {
        bot.model
            .clone()
            .unwrap_or_else(|| self.config.provider.model.clone())
    }

    fn think_level(&self) -> ThinkLevel {
        ThinkLevel::from_str(&self.config.provider.think_level).unwrap_or_default()
    }
}

/// Reduce a bot label to a filesystem-safe file name stem.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "bot".to_string()
    } else {
        cleaned
    }
}
