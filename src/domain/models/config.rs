//! Configuration structures for drover.
//!
//! Loaded by `infrastructure::config::ConfigLoader` via figment with
//! defaults → `drover.yaml` → `DROVER_*` environment overrides.

use serde::{Deserialize, Serialize};

/// Main configuration structure for drover.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Scheduler/engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Reasoning provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Tool group settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Skill catalog settings
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite:.drover/drover.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Scheduler and execution-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Seconds between scheduler ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Seconds before the first scheduler tick
    #[serde(default = "default_initial_tick_delay_secs")]
    pub initial_tick_delay_secs: u64,

    /// Directory for per-run log files
    #[serde(default = "default_run_log_dir")]
    pub run_log_dir: String,

    /// Write a plain-text log file per run
    #[serde(default)]
    pub file_logging: bool,

    /// Include raw inference output in log entry details
    #[serde(default)]
    pub log_inference_output: bool,
}

const fn default_tick_interval_secs() -> u64 {
    15
}

const fn default_initial_tick_delay_secs() -> u64 {
    3
}

fn default_run_log_dir() -> String {
    ".drover/runs".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            initial_tick_delay_secs: default_initial_tick_delay_secs(),
            run_log_dir: default_run_log_dir(),
            file_logging: false,
            log_inference_output: false,
        }
    }
}

/// Reasoning provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// Base URL of the streaming messages endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model when a bot does not select one
    #[serde(default = "default_model")]
    pub model: String,

    /// Default reasoning/think level: off, low, medium, high
    #[serde(default = "default_think_level")]
    pub think_level: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_key_env() -> String {
    "DROVER_API_KEY".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_think_level() -> String {
    "off".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            think_level: default_think_level(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Tool group settings handed to execution sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolsConfig {
    /// Enabled tool groups (e.g. "browser", "git", "os")
    #[serde(default)]
    pub enabled_groups: Vec<String>,
}

/// Skill catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SkillsConfig {
    /// Directory of YAML skill definitions
    #[serde(default = "default_skills_dir")]
    pub dir: String,
}

fn default_skills_dir() -> String {
    ".drover/skills".to_string()
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            dir: default_skills_dir(),
        }
    }
}

/// Logging configuration for the daemon's own diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for rotated daemon log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: None,
        }
    }
}
