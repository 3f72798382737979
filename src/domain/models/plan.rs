//! Transient plan model.
//!
//! A plan is the in-memory goal + ordered step list produced for one
//! execution cycle, either by the reasoning provider or from durable
//! step overrides. It is never persisted; only its side effects (log
//! entries, final bot fields) survive the cycle.

use serde::{Deserialize, Serialize};

/// Status of a single plan step within the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Skipped,
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One step of a transient plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based position within the plan.
    pub number: u32,
    pub description: String,
    pub status: StepStatus,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl PlanStep {
    pub fn new(number: u32, description: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
            status: StepStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// A goal plus its ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Build a plan from step descriptions, numbering them 1-based in order.
    pub fn new(goal: impl Into<String>, descriptions: Vec<String>) -> Self {
        let steps = descriptions
            .into_iter()
            .enumerate()
            .map(|(i, desc)| PlanStep::new(i as u32 + 1, desc))
            .collect();
        Self {
            goal: goal.into(),
            steps,
        }
    }

    /// Build a plan directly from durable step overrides, keeping their order.
    pub fn from_overrides(goal: impl Into<String>, overrides: &[StepOverride]) -> Self {
        let steps = overrides
            .iter()
            .map(|o| PlanStep::new(o.step_number, o.description.clone()))
            .collect();
        Self {
            goal: goal.into(),
            steps,
        }
    }
}

/// A durable, user-supplied plan step for one bot.
///
/// When any overrides exist for a bot they are used verbatim and plan
/// generation is skipped for that cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOverride {
    pub step_number: u32,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_numbers_steps_in_order() {
        let plan = Plan::new("g", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].number, 1);
        assert_eq!(plan.steps[1].number, 2);
        assert_eq!(plan.steps[1].description, "b");
        assert_eq!(plan.steps[0].status, StepStatus::Pending);
    }

    #[test]
    fn test_plan_from_overrides_keeps_numbers() {
        let overrides = vec![
            StepOverride {
                step_number: 1,
                description: "first".to_string(),
            },
            StepOverride {
                step_number: 2,
                description: "second".to_string(),
            },
        ];
        let plan = Plan::from_overrides("g", &overrides);
        assert_eq!(plan.steps[0].number, 1);
        assert_eq!(plan.steps[1].description, "second");
    }
}
