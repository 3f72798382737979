pub mod event_bus;
pub mod plan_parser;
pub mod prompts;
pub mod run_logger;
pub mod schedule_policy;

pub use event_bus::{EngineEvent, EventBus, EventBusConfig};
pub use run_logger::{LiveRunSink, RunLogger};
