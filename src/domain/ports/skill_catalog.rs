use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::Skill;

/// Skill catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read skill directory: {0}")]
    ReadDir(String),

    #[error("failed to parse skill file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Port for loading the full catalog of available skills.
#[async_trait]
pub trait SkillCatalog: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Skill>, CatalogError>;
}
