//! Implementation of the `drover run` command: the scheduler daemon.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::application::BotScheduler;
use crate::domain::models::Config;
use crate::infrastructure::reasoning::HttpReasoningProvider;
use crate::infrastructure::skills::YamlSkillCatalog;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Start every bot whose record is marked running, even if its
    /// next run time lies in the future
    #[arg(long)]
    pub resume_all: bool,
}

pub async fn execute(args: RunArgs, config: Config, _json_mode: bool) -> Result<()> {
    let config = Arc::new(config);
    let (pool, store) = super::open_store(&config).await?;

    let provider = Arc::new(
        HttpReasoningProvider::new(config.provider.clone())
            .context("failed to build reasoning provider")?,
    );
    let catalog = Arc::new(YamlSkillCatalog::new(config.skills.dir.clone()));

    let scheduler = BotScheduler::new(store.clone(), provider, catalog, Arc::clone(&config));

    if args.resume_all {
        use crate::domain::models::BotStatus;
        use crate::domain::ports::BotRepository;
        for bot in store.list().await? {
            if bot.status == BotStatus::Running {
                scheduler.start(bot.id).await?;
            }
        }
    }

    let tick = Arc::clone(&scheduler).spawn_tick_loop();
    info!("drover daemon running; press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutting down");

    scheduler.shutdown();
    scheduler.stop_all().await?;
    let _ = tick.await;
    pool.close().await;
    Ok(())
}
