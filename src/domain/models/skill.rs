//! Skill domain model.
//!
//! A skill is a named bundle of system-prompt text plus the tool groups
//! it needs, selectable per bot.

use serde::{Deserialize, Serialize};

/// A selectable capability bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Stable identifier referenced by `Bot::skill_ids`.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Text merged into execution system prompts when the skill is enabled.
    pub prompt_template: String,
    /// Tool groups this skill requires.
    #[serde(default)]
    pub tool_groups: Vec<String>,
}
