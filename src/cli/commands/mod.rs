//! CLI command implementations.

pub mod bot;
pub mod init;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::domain::models::Config;
use crate::infrastructure::database::{self, SqliteBotRepository};

/// Connect to the configured database, creating its directory first.
pub(crate) async fn open_store(config: &Config) -> Result<(SqlitePool, Arc<SqliteBotRepository>)> {
    if let Some(path) = config.database.url.strip_prefix("sqlite:") {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
    }

    let pool = database::connect(&config.database.url)
        .await
        .context("failed to open database")?;
    let repo = Arc::new(SqliteBotRepository::new(pool.clone()));
    Ok((pool, repo))
}
