//! Command-line interface for drover.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// drover: a runtime scheduler for long-lived autonomous bots.
#[derive(Parser)]
#[command(name = "drover", version, about)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a configuration file (defaults to drover.yaml + env)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default drover.yaml to the working directory
    Init(commands::init::InitArgs),
    /// Run the scheduler daemon
    Run(commands::run::RunArgs),
    /// Manage bots
    Bot(commands::bot::BotArgs),
}

/// Print an error (plain or JSON) and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": format!("{:#}", err) });
        eprintln!("{}", payload);
    } else {
        eprintln!("{} {:#}", console::style("error:").red().bold(), err);
    }
    std::process::exit(1);
}
