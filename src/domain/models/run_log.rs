//! Run log domain model.
//!
//! Entries are append-only and correlated to a cycle via the bot's run
//! counter. They are removed only by an explicit clear operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity/kind of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Debug,
    Warning,
    Error,
    RunStart,
    StepStart,
    StepComplete,
    UserPrompt,
    UserResponse,
    SkillAction,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::RunStart => "run_start",
            Self::StepStart => "step_start",
            Self::StepComplete => "step_complete",
            Self::UserPrompt => "user_prompt",
            Self::UserResponse => "user_response",
            Self::SkillAction => "skill_action",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "run_start" => Some(Self::RunStart),
            "step_start" => Some(Self::StepStart),
            "step_complete" => Some(Self::StepComplete),
            "user_prompt" => Some(Self::UserPrompt),
            "user_response" => Some(Self::UserResponse),
            "skill_action" => Some(Self::SkillAction),
            _ => None,
        }
    }

    /// Fixed-width label used in per-run log files.
    pub fn padded(&self) -> String {
        format!("{:<13}", self.as_str().to_uppercase())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One durable log entry for a bot cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub id: Uuid,
    pub bot_id: Uuid,
    /// Value of the bot's run counter when the entry was written.
    pub run_number: i64,
    pub level: LogLevel,
    pub message: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RunLogEntry {
    pub fn new(bot_id: Uuid, run_number: i64, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bot_id,
            run_number,
            level,
            message: message.into(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        for level in [
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::RunStart,
            LogLevel::StepStart,
            LogLevel::StepComplete,
            LogLevel::UserPrompt,
            LogLevel::UserResponse,
            LogLevel::SkillAction,
        ] {
            assert_eq!(LogLevel::from_str(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_padded_width() {
        assert_eq!(LogLevel::Info.padded().len(), 13);
        assert_eq!(LogLevel::StepComplete.padded().len(), 13);
    }

    #[test]
    fn test_entry_with_detail() {
        let bot_id = Uuid::new_v4();
        let entry = RunLogEntry::new(bot_id, 3, LogLevel::Info, "hello").with_detail("world");
        assert_eq!(entry.bot_id, bot_id);
        assert_eq!(entry.run_number, 3);
        assert_eq!(entry.detail.as_deref(), Some("world"));
    }
}
