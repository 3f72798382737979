//! YAML-backed skill catalog.
//!
//! Each `*.yaml`/`*.yml` file in the configured directory defines one
//! skill. Unreadable or malformed files are logged and skipped so one
//! bad definition never hides the rest of the catalog.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::models::Skill;
use crate::domain::ports::{CatalogError, SkillCatalog};

pub struct YamlSkillCatalog {
    dir: PathBuf,
}

impl YamlSkillCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SkillCatalog for YamlSkillCatalog {
    async fn load_all(&self) -> Result<Vec<Skill>, CatalogError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // A missing skill directory is an empty catalog, not an error.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(CatalogError::ReadDir(err.to_string())),
        };

        let mut skills = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if !is_yaml {
                continue;
            }

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("skipping unreadable skill file {}: {}", path.display(), err);
                    continue;
                }
            };

            match serde_yaml::from_str::<Skill>(&raw) {
                Ok(skill) => skills.push(skill),
                Err(err) => {
                    warn!("skipping malformed skill file {}: {}", path.display(), err);
                }
            }
        }

        skills.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(skills)
    }
}
