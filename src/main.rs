//! Drover CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drover::cli::{Cli, Commands};
use drover::domain::models::Config;
use drover::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            drover::cli::handle_error(err, cli.json);
            return;
        }
    };

    let _log_guard = init_tracing(&config);

    let result = match cli.command {
        Commands::Init(args) => drover::cli::commands::init::execute(args, cli.json).await,
        Commands::Run(args) => drover::cli::commands::run::execute(args, config, cli.json).await,
        Commands::Bot(args) => drover::cli::commands::bot::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        drover::cli::handle_error(err, cli.json);
    }
}

/// Initialize tracing: env filter over the configured level, stderr by
/// default, a rolling daily file when `logging.dir` is set. The guard
/// keeps the background writer alive for the process lifetime.
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(dir) = &config.logging.dir {
        let appender = tracing_appender::rolling::daily(dir, "drover.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if config.logging.format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
        return Some(guard);
    }

    if config.logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    None
}
