pub mod bot;
pub mod config;
pub mod plan;
pub mod run_log;
pub mod skill;

pub use bot::{Bot, BotStatus, ScheduleKind};
pub use config::{
    Config, DatabaseConfig, EngineConfig, LoggingConfig, ProviderConfig, SkillsConfig,
    ToolsConfig,
};
pub use plan::{Plan, PlanStep, StepOverride, StepStatus};
pub use run_log::{LogLevel, RunLogEntry};
pub use skill::Skill;
