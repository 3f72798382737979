//! SQLite implementation of the bot repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::models::{Bot, BotStatus, LogLevel, RunLogEntry, ScheduleKind, StepOverride};
use crate::domain::ports::bot_repository::BotRepository;
use crate::domain::ports::errors::DatabaseError;
use crate::infrastructure::database::utils::parse_datetime;

/// SQLite implementation of BotRepository using sqlx.
pub struct SqliteBotRepository {
    pool: SqlitePool,
}

impl SqliteBotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Helper to convert a database row to a Bot.
    fn row_to_bot(row: &sqlx::sqlite::SqliteRow) -> Result<Bot, DatabaseError> {
        let schedule: ScheduleKind = serde_json::from_str(&row.get::<String, _>("schedule"))?;
        let status_raw: String = row.get("status");
        let status = BotStatus::from_str(&status_raw)
            .ok_or_else(|| DatabaseError::InvalidValue(format!("status '{}'", status_raw)))?;

        Ok(Bot {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            name: row.get("name"),
            goal: row.get("goal"),
            persona: row.get("persona"),
            model: row.get("model"),
            temperature: row.get::<f64, _>("temperature") as f32,
            max_tokens: row.get::<i64, _>("max_tokens") as u32,
            skill_ids: serde_json::from_str(&row.get::<String, _>("skill_ids"))?,
            schedule,
            status,
            next_run_at: row
                .get::<Option<String>, _>("next_run_at")
                .as_ref()
                .and_then(|s| parse_datetime(s).ok()),
            last_run_at: row
                .get::<Option<String>, _>("last_run_at")
                .as_ref()
                .and_then(|s| parse_datetime(s).ok()),
            run_count: row.get("run_count"),
            pending_question: row.get("pending_question"),
            last_error: row.get("last_error"),
            retry_guidance: row.get("retry_guidance"),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
            updated_at: parse_datetime(row.get::<String, _>("updated_at").as_str())?,
        })
    }

    fn row_to_log(row: &sqlx::sqlite::SqliteRow) -> Result<RunLogEntry, DatabaseError> {
        let level_raw: String = row.get("level");
        let level = LogLevel::from_str(&level_raw)
            .ok_or_else(|| DatabaseError::InvalidValue(format!("log level '{}'", level_raw)))?;

        Ok(RunLogEntry {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            bot_id: Uuid::parse_str(row.get::<String, _>("bot_id").as_str())?,
            run_number: row.get("run_number"),
            level,
            message: row.get("message"),
            detail: row.get("detail"),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl BotRepository for SqliteBotRepository {
    async fn insert(&self, bot: &Bot) -> Result<(), DatabaseError> {
        let id = bot.id.to_string();
        let schedule = serde_json::to_string(&bot.schedule)?;
        let status = bot.status.as_str();
        let skill_ids = serde_json::to_string(&bot.skill_ids)?;
        let next_run_at = bot.next_run_at.map(|dt| dt.to_rfc3339());
        let last_run_at = bot.last_run_at.map(|dt| dt.to_rfc3339());
        let created_at = bot.created_at.to_rfc3339();
        let updated_at = bot.updated_at.to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO bots (
                id, name, goal, persona, model, temperature, max_tokens,
                skill_ids, schedule, status, next_run_at, last_run_at,
                run_count, pending_question, last_error, retry_guidance,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&bot.name)
        .bind(&bot.goal)
        .bind(&bot.persona)
        .bind(&bot.model)
        .bind(f64::from(bot.temperature))
        .bind(i64::from(bot.max_tokens))
        .bind(&skill_ids)
        .bind(&schedule)
        .bind(status)
        .bind(&next_run_at)
        .bind(&last_run_at)
        .bind(bot.run_count)
        .bind(&bot.pending_question)
        .bind(&bot.last_error)
        .bind(&bot.retry_guidance)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Bot>, DatabaseError> {
        let id_str = id.to_string();
        let row = sqlx::query("SELECT * FROM bots WHERE id = ?")
            .bind(&id_str)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_bot).transpose()
    }

    async fn update(&self, bot: &Bot) -> Result<(), DatabaseError> {
        let id = bot.id.to_string();
        let schedule = serde_json::to_string(&bot.schedule)?;
        let status = bot.status.as_str();
        let skill_ids = serde_json::to_string(&bot.skill_ids)?;
        let next_run_at = bot.next_run_at.map(|dt| dt.to_rfc3339());
        let last_run_at = bot.last_run_at.map(|dt| dt.to_rfc3339());
        let updated_at = bot.updated_at.to_rfc3339();

        sqlx::query(
            r#"
            UPDATE bots SET
                name = ?, goal = ?, persona = ?, model = ?, temperature = ?,
                max_tokens = ?, skill_ids = ?, schedule = ?, status = ?,
                next_run_at = ?, last_run_at = ?, run_count = ?,
                pending_question = ?, last_error = ?, retry_guidance = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&bot.name)
        .bind(&bot.goal)
        .bind(&bot.persona)
        .bind(&bot.model)
        .bind(f64::from(bot.temperature))
        .bind(i64::from(bot.max_tokens))
        .bind(&skill_ids)
        .bind(&schedule)
        .bind(status)
        .bind(&next_run_at)
        .bind(&last_run_at)
        .bind(bot.run_count)
        .bind(&bot.pending_question)
        .bind(&bot.last_error)
        .bind(&bot.retry_guidance)
        .bind(&updated_at)
        .bind(&id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM step_overrides WHERE bot_id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM run_logs WHERE bot_id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM bots WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Bot>, DatabaseError> {
        let rows = sqlx::query("SELECT * FROM bots ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_bot).collect()
    }

    async fn list_runnable(&self, now: DateTime<Utc>) -> Result<Vec<Bot>, DatabaseError> {
        let now_str = now.to_rfc3339();
        let rows = sqlx::query(
            "SELECT * FROM bots WHERE status = 'running'
             AND (next_run_at IS NULL OR next_run_at <= ?)
             ORDER BY created_at",
        )
        .bind(&now_str)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_bot).collect()
    }

    async fn append_log(&self, entry: &RunLogEntry) -> Result<(), DatabaseError> {
        let id = entry.id.to_string();
        let bot_id = entry.bot_id.to_string();
        let created_at = entry.created_at.to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO run_logs (id, bot_id, run_number, level, message, detail, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&bot_id)
        .bind(entry.run_number)
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .bind(&entry.detail)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_logs(&self, bot_id: Uuid, limit: i64) -> Result<Vec<RunLogEntry>, DatabaseError> {
        let bot_id_str = bot_id.to_string();
        let rows = sqlx::query(
            "SELECT * FROM run_logs WHERE bot_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(&bot_id_str)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_log).collect()
    }

    async fn clear_logs(&self, bot_id: Uuid) -> Result<(), DatabaseError> {
        let bot_id_str = bot_id.to_string();
        sqlx::query("DELETE FROM run_logs WHERE bot_id = ?")
            .bind(&bot_id_str)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_step_overrides(&self, bot_id: Uuid) -> Result<Vec<StepOverride>, DatabaseError> {
        let bot_id_str = bot_id.to_string();
        let rows = sqlx::query(
            "SELECT step_number, description FROM step_overrides
             WHERE bot_id = ? ORDER BY step_number",
        )
        .bind(&bot_id_str)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| StepOverride {
                step_number: row.get::<i64, _>("step_number") as u32,
                description: row.get("description"),
            })
            .collect())
    }

    async fn set_step_overrides(
        &self,
        bot_id: Uuid,
        steps: &[StepOverride],
    ) -> Result<(), DatabaseError> {
        let bot_id_str = bot_id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM step_overrides WHERE bot_id = ?")
            .bind(&bot_id_str)
            .execute(&mut *tx)
            .await?;

        for step in steps {
            sqlx::query(
                "INSERT INTO step_overrides (bot_id, step_number, description) VALUES (?, ?, ?)",
            )
            .bind(&bot_id_str)
            .bind(i64::from(step.step_number))
            .bind(&step.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
