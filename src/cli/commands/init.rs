//! Implementation of the `drover init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing drover.yaml
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target = args.path.join("drover.yaml");

    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            target.display()
        );
    }

    let rendered = serde_yaml::to_string(&Config::default())
        .context("failed to render default configuration")?;
    fs::create_dir_all(&args.path)
        .await
        .with_context(|| format!("failed to create {}", args.path.display()))?;
    fs::write(&target, rendered)
        .await
        .with_context(|| format!("failed to write {}", target.display()))?;

    if json_mode {
        println!(
            "{}",
            serde_json::json!({ "written": target.display().to_string() })
        );
    } else {
        println!("Wrote default configuration to {}", target.display());
    }
    Ok(())
}
