//! Database connection pool with SQLite configuration tuned for
//! concurrent access: WAL journal, NORMAL synchronous, foreign keys,
//! and a busy timeout. The schema is applied on connect.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::domain::ports::errors::DatabaseError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bots (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    goal TEXT NOT NULL,
    persona TEXT,
    model TEXT,
    temperature REAL NOT NULL DEFAULT 0.7,
    max_tokens INTEGER NOT NULL DEFAULT 4096,
    skill_ids TEXT NOT NULL DEFAULT '[]',
    schedule TEXT NOT NULL,
    status TEXT NOT NULL,
    next_run_at TEXT,
    last_run_at TEXT,
    run_count INTEGER NOT NULL DEFAULT 0,
    pending_question TEXT,
    last_error TEXT,
    retry_guidance TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bots_status ON bots(status);

CREATE TABLE IF NOT EXISTS run_logs (
    id TEXT PRIMARY KEY,
    bot_id TEXT NOT NULL,
    run_number INTEGER NOT NULL,
    level TEXT NOT NULL,
    message TEXT NOT NULL,
    detail TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_run_logs_bot ON run_logs(bot_id, created_at);

CREATE TABLE IF NOT EXISTS step_overrides (
    bot_id TEXT NOT NULL,
    step_number INTEGER NOT NULL,
    description TEXT NOT NULL,
    PRIMARY KEY (bot_id, step_number)
);
"#;

/// Connect to the database and apply the schema.
///
/// In-memory URLs get a single-connection pool (each SQLite memory
/// connection is its own database) and keep the default journal mode.
pub async fn connect(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    let is_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DatabaseError::ConnectionPoolError(format!("invalid database URL: {}", e)))?
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .create_if_missing(true);
    if !is_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if is_memory { 1 } else { 10 })
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))?;

    apply_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes if they do not exist.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
