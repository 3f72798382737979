//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces infrastructure
//! adapters implement:
//! - BotRepository: persistence for bots, run logs, and step overrides
//! - ReasoningProvider / ReasoningSession: streaming inference sessions
//! - SkillCatalog: skill definition loading
//!
//! The engine depends only on these contracts, never on concrete
//! adapters.

pub mod bot_repository;
pub mod errors;
pub mod reasoning;
pub mod skill_catalog;

pub use bot_repository::BotRepository;
pub use errors::DatabaseError;
pub use reasoning::{
    ChunkKind, ChunkStream, ProviderError, ReasoningProvider, ReasoningSession, SendOptions,
    SessionRequest, SessionStats, StreamChunk, ThinkLevel,
};
pub use skill_catalog::{CatalogError, SkillCatalog};
