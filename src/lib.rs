//! Drover - Bot Runtime Scheduler
//!
//! Drover runs many independent, long-lived autonomous bots, each with
//! its own schedule, retry policy, and conversational state, driving a
//! streaming reasoning provider through a plan, execute, synthesize
//! pipeline.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models and the ports the engine consumes
//! - **Service Layer** (`services`): pure policy, parsing, and the log sink
//! - **Application Layer** (`application`): scheduler, registry, execution cycle
//! - **Infrastructure Layer** (`infrastructure`): SQLite store, HTTP provider,
//!   skill catalog, configuration
//! - **CLI Layer** (`cli`): command-line interface

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{BotRuntime, BotScheduler, CycleExecutor, RuntimeRegistry};
pub use domain::models::{
    Bot, BotStatus, Config, LogLevel, Plan, PlanStep, RunLogEntry, ScheduleKind, Skill,
    StepOverride, StepStatus,
};
pub use domain::ports::{
    BotRepository, ChunkKind, ProviderError, ReasoningProvider, ReasoningSession, SkillCatalog,
    StreamChunk,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::database::SqliteBotRepository;
pub use services::{EngineEvent, EventBus};
