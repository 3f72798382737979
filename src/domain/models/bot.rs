//! Bot domain model.
//!
//! A bot is one independently scheduled autonomous unit with its own
//! goal, schedule, and lifecycle status. The scheduler owns its
//! transitions; external editors may also mutate the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// When a bot's next cycle should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Run a single cycle, then complete.
    Once,
    /// Run back-to-back cycles with no gap.
    Continuous,
    /// Run every `minutes` minutes.
    Interval { minutes: u32 },
    /// Run once per hour.
    Hourly,
    /// Run once per day.
    Daily,
}

impl Default for ScheduleKind {
    fn default() -> Self {
        Self::Once
    }
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Continuous => "continuous",
            Self::Interval { .. } => "interval",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }

    /// Human-readable description of the schedule.
    pub fn description(&self) -> String {
        match self {
            Self::Once => "once".to_string(),
            Self::Continuous => "continuously".to_string(),
            Self::Interval { minutes } => format!("every {} minute(s)", minutes),
            Self::Hourly => "every hour".to_string(),
            Self::Daily => "every day".to_string(),
        }
    }
}

/// Lifecycle status of a bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    /// Defined but not scheduled.
    Idle,
    /// Scheduled; the runtime loop is (or will be) executing cycles.
    Running,
    /// Blocked on a pending question to the user.
    WaitingForInput,
    /// Terminal: a one-shot bot finished its cycle.
    Completed,
    /// Terminal: marked failed by an external surface.
    Failed,
    /// Terminal: explicitly stopped.
    Stopped,
}

impl Default for BotStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::WaitingForInput => "waiting_for_input",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "waiting_for_input" | "waiting-for-input" => Some(Self::WaitingForInput),
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Check if this is a terminal state for the runtime loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persistent bot definition plus its runtime bookkeeping.
///
/// Invariant: `next_run_at == None` means the scheduler tick will not
/// auto-start this bot. `status == Running` with `next_run_at == None`
/// only occurs transiently while a one-shot cycle is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: Uuid,
    /// Human-readable label (also used to name per-run log files).
    pub name: String,
    /// Natural-language goal the bot pursues each cycle.
    pub goal: String,
    /// Optional persona text injected into system prompts.
    pub persona: Option<String>,
    /// Model selector; `None` falls back to the configured default.
    pub model: Option<String>,
    /// Sampling temperature for execution sessions.
    pub temperature: f32,
    /// Output-token budget for execution sessions.
    pub max_tokens: u32,
    /// Enabled skill ids; empty means all catalog skills.
    pub skill_ids: Vec<String>,

    // -- Schedule --
    pub schedule: ScheduleKind,

    // -- Lifecycle --
    pub status: BotStatus,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    /// Monotonic cycle counter, incremented once per cycle attempt.
    pub run_count: i64,
    /// Set when the bot is blocked on user input.
    pub pending_question: Option<String>,
    /// Message of the most recent cycle failure.
    pub last_error: Option<String>,
    /// Free text describing the previous failure, injected into the
    /// next cycle's prompts. Cleared on a successful cycle.
    pub retry_guidance: Option<String>,

    // -- Timestamps --
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bot {
    /// Create a new idle bot with defaults.
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            goal: goal.into(),
            persona: None,
            model: None,
            temperature: 0.7,
            max_tokens: 4096,
            skill_ids: Vec::new(),
            schedule: ScheduleKind::Once,
            status: BotStatus::Idle,
            next_run_at: None,
            last_run_at: None,
            run_count: 0,
            pending_question: None,
            last_error: None,
            retry_guidance: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Builder methods
    pub fn with_schedule(mut self, schedule: ScheduleKind) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_skills(mut self, skill_ids: Vec<String>) -> Self {
        self.skill_ids = skill_ids;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}
