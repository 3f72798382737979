//! Implementation of the `drover bot` subcommands.
//!
//! These commands edit the durable records; a running daemon picks the
//! changes up through its scheduler tick and per-loop record reloads.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::output;
use crate::domain::models::{Bot, BotStatus, Config, LogLevel, RunLogEntry, ScheduleKind, StepOverride};
use crate::domain::ports::BotRepository;

#[derive(Args, Debug)]
pub struct BotArgs {
    #[command(subcommand)]
    pub command: BotCommand,
}

#[derive(Subcommand, Debug)]
pub enum BotCommand {
    /// Create a new bot
    Add {
        /// Human-readable label
        #[arg(long)]
        name: String,
        /// Natural-language goal
        #[arg(long)]
        goal: String,
        /// Schedule: once, continuous, hourly, daily, or interval
        #[arg(long, default_value = "once")]
        schedule: String,
        /// Minutes between runs (with --schedule interval)
        #[arg(long)]
        interval_minutes: Option<u32>,
        /// Persona text injected into prompts
        #[arg(long)]
        persona: Option<String>,
        /// Model selector (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Sampling temperature for execution sessions
        #[arg(long, default_value_t = 0.7)]
        temperature: f32,
        /// Output-token budget for execution sessions
        #[arg(long, default_value_t = 4096)]
        max_tokens: u32,
        /// Enabled skill ids (comma separated; empty means all)
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },
    /// List all bots
    List,
    /// Show one bot record
    Show { id: Uuid },
    /// Mark a bot running so the daemon starts it on its next tick
    Start { id: Uuid },
    /// Mark a bot stopped; takes effect at its next wake-up
    Stop { id: Uuid },
    /// Record a user message for the bot's next run
    Send { id: Uuid, text: String },
    /// Show recent run log entries
    Logs {
        id: Uuid,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Replace the bot's durable step overrides (empty clears them)
    Steps {
        id: Uuid,
        /// Step descriptions in order
        steps: Vec<String>,
    },
    /// Delete a bot and its logs
    Remove { id: Uuid },
}

pub async fn execute(args: BotArgs, config: Config, json_mode: bool) -> Result<()> {
    let (pool, store) = super::open_store(&config).await?;
    let result = dispatch(args.command, store.as_ref(), json_mode).await;
    pool.close().await;
    result
}

async fn dispatch(
    command: BotCommand,
    store: &dyn BotRepository,
    json_mode: bool,
) -> Result<()> {
    match command {
        BotCommand::Add {
            name,
            goal,
            schedule,
            interval_minutes,
            persona,
            model,
            temperature,
            max_tokens,
            skills,
        } => {
            let schedule = parse_schedule(&schedule, interval_minutes)?;
            let mut bot = Bot::new(name, goal)
                .with_schedule(schedule)
                .with_skills(skills)
                .with_temperature(temperature)
                .with_max_tokens(max_tokens);
            if let Some(persona) = persona {
                bot = bot.with_persona(persona);
            }
            if let Some(model) = model {
                bot = bot.with_model(model);
            }
            store.insert(&bot).await?;

            if json_mode {
                println!("{}", serde_json::to_string_pretty(&bot)?);
            } else {
                println!("Created bot {} ({})", bot.name, bot.id);
            }
        }
        BotCommand::List => {
            let bots = store.list().await?;
            if json_mode {
                println!("{}", serde_json::to_string_pretty(&bots)?);
            } else {
                println!("{}", output::bot_table(&bots));
            }
        }
        BotCommand::Show { id } => {
            let bot = store
                .get(id)
                .await?
                .with_context(|| format!("no bot with id {}", id))?;
            println!("{}", serde_json::to_string_pretty(&bot)?);
        }
        BotCommand::Start { id } => {
            let mut bot = store
                .get(id)
                .await?
                .with_context(|| format!("no bot with id {}", id))?;
            let now = Utc::now();
            bot.status = BotStatus::Running;
            bot.next_run_at = Some(now);
            bot.updated_at = now;
            store.update(&bot).await?;
            println!("Bot {} marked running; the daemon will pick it up", bot.name);
        }
        BotCommand::Stop { id } => {
            let mut bot = store
                .get(id)
                .await?
                .with_context(|| format!("no bot with id {}", id))?;
            bot.status = BotStatus::Stopped;
            bot.pending_question = None;
            bot.next_run_at = None;
            bot.updated_at = Utc::now();
            store.update(&bot).await?;
            println!("Bot {} stopped", bot.name);
        }
        BotCommand::Send { id, text } => {
            let run = store.get(id).await?.map(|b| b.run_count).unwrap_or(0);
            let entry = RunLogEntry::new(id, run, LogLevel::UserResponse, text);
            store.append_log(&entry).await?;
            println!("Queued message for bot {}", id);
        }
        BotCommand::Logs { id, limit } => {
            let entries = store.list_logs(id, limit).await?;
            if json_mode {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", output::log_lines(&entries));
            }
        }
        BotCommand::Steps { id, steps } => {
            let overrides: Vec<StepOverride> = steps
                .iter()
                .enumerate()
                .map(|(i, description)| StepOverride {
                    step_number: i as u32 + 1,
                    description: description.clone(),
                })
                .collect();
            store.set_step_overrides(id, &overrides).await?;
            if overrides.is_empty() {
                println!("Cleared step overrides for {}", id);
            } else {
                println!("Set {} step override(s) for {}", overrides.len(), id);
            }
        }
        BotCommand::Remove { id } => {
            store.delete(id).await?;
            println!("Removed bot {}", id);
        }
    }
    Ok(())
}

fn parse_schedule(kind: &str, interval_minutes: Option<u32>) -> Result<ScheduleKind> {
    match kind.to_lowercase().as_str() {
        "once" => Ok(ScheduleKind::Once),
        "continuous" => Ok(ScheduleKind::Continuous),
        "hourly" => Ok(ScheduleKind::Hourly),
        "daily" => Ok(ScheduleKind::Daily),
        "interval" => {
            let minutes = interval_minutes
                .context("--interval-minutes is required with --schedule interval")?;
            anyhow::ensure!(minutes > 0, "--interval-minutes must be positive");
            Ok(ScheduleKind::Interval { minutes })
        }
        other => anyhow::bail!(
            "unknown schedule '{}'; expected once, continuous, interval, hourly, or daily",
            other
        ),
    }
}
