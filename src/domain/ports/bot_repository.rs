use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{Bot, RunLogEntry, StepOverride};
use crate::domain::ports::errors::DatabaseError;

/// Repository port for bot persistence.
///
/// The store is assumed to serialize its own writes per record;
/// read-modify-write races between the scheduler and an external editor
/// resolve last-writer-wins.
#[async_trait]
pub trait BotRepository: Send + Sync {
    /// Insert a new bot
    async fn insert(&self, bot: &Bot) -> Result<(), DatabaseError>;

    /// Get a bot by ID
    async fn get(&self, id: Uuid) -> Result<Option<Bot>, DatabaseError>;

    /// Update an existing bot
    async fn update(&self, bot: &Bot) -> Result<(), DatabaseError>;

    /// Delete a bot and its logs and overrides
    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// List all bots
    async fn list(&self) -> Result<Vec<Bot>, DatabaseError>;

    /// List bots the scheduler tick should start: status Running and
    /// next_run_at unset or due.
    async fn list_runnable(&self, now: DateTime<Utc>) -> Result<Vec<Bot>, DatabaseError>;

    /// Append a run log entry
    async fn append_log(&self, entry: &RunLogEntry) -> Result<(), DatabaseError>;

    /// List the most recent run log entries for a bot, newest first
    async fn list_logs(&self, bot_id: Uuid, limit: i64) -> Result<Vec<RunLogEntry>, DatabaseError>;

    /// Delete all run log entries for a bot
    async fn clear_logs(&self, bot_id: Uuid) -> Result<(), DatabaseError>;

    /// Get durable step overrides for a bot, ordered by step number
    async fn get_step_overrides(&self, bot_id: Uuid) -> Result<Vec<StepOverride>, DatabaseError>;

    /// Replace the step overrides for a bot
    async fn set_step_overrides(
        &self,
        bot_id: Uuid,
        steps: &[StepOverride],
    ) -> Result<(), DatabaseError>;
}
