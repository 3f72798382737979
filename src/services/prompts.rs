//! Prompt construction for the three session flavors.
//!
//! Planning sessions get strict output-format instructions with one
//! worked example; execution sessions get persona, skills, and tool
//! groups; synthesis sessions get neither tools nor skills.

use crate::domain::models::{Bot, PlanStep, Skill};

/// System prompt for a planning session.
///
/// Retry guidance from a previous failed cycle and any queued user
/// instructions are embedded verbatim so the next plan can adapt.
pub fn planning_prompt(bot: &Bot, user_instructions: &[String], retry_guidance: Option<&str>) -> String {
    let persona = bot
        .persona
        .as_deref()
        .map(|p| format!("\n## Persona\n{}\n", p))
        .unwrap_or_default();

    let guidance = retry_guidance
        .map(|g| format!("\n## Guidance From Previous Attempt\n{}\n", g))
        .unwrap_or_default();

    let instructions = if user_instructions.is_empty() {
        String::new()
    } else {
        format!(
            "\n## User Instructions For This Run\n{}\n",
            user_instructions.join("\n")
        )
    };

    format!(
        r#"You are a planning assistant for an autonomous bot.
{persona}{guidance}{instructions}
## Task
Break the goal below into at most 5 concrete, ordered steps a single
agent can carry out in sequence. Prefer fewer, larger steps over many
small ones.

## Required Output Format
Respond with exactly one plan block and nothing else:

<plan>
<goal>Restate the goal in one sentence</goal>
<step>First concrete action</step>
<step>Second concrete action</step>
</plan>

## Example
Goal: "Summarize overnight service alerts into a digest"

<plan>
<goal>Produce a digest of overnight service alerts</goal>
<step>Collect all alerts raised since the last digest</step>
<step>Group the alerts by service and severity</step>
<step>Write a short digest with the most severe items first</step>
</plan>

IMPORTANT: Output ONLY the plan block, no other text."#,
    )
}

/// System prompt for an execution or direct-execution session.
pub fn execution_prompt(bot: &Bot, skills: &[Skill], tool_groups: &[String]) -> String {
    let persona = bot
        .persona
        .as_deref()
        .map(|p| format!("\n## Persona\n{}\n", p))
        .unwrap_or_default();

    let skills_text = if skills.is_empty() {
        "None available".to_string()
    } else {
        skills
            .iter()
            .map(|s| format!("### {}\n{}", s.name, s.prompt_template))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let tools_text = if tool_groups.is_empty() {
        "None enabled".to_string()
    } else {
        tool_groups.join(", ")
    };

    format!(
        r#"You are an autonomous bot working toward a standing goal.
{persona}
## Skills
{skills_text}

## Enabled Tool Groups
{tools_text}

## Instructions
Carry out the work you are given directly and report what you did.
Be concrete: include the facts, outputs, or artifacts you produced.
Do not ask questions; make reasonable assumptions and note them."#,
    )
}

/// System prompt for a synthesis session (no tools, no skills).
pub fn synthesis_prompt(bot: &Bot) -> String {
    let persona = bot
        .persona
        .as_deref()
        .map(|p| format!("\n## Persona\n{}\n", p))
        .unwrap_or_default();

    format!(
        r#"You are summarizing the results of an autonomous bot run.
{persona}
Write a concise summary of what was accomplished across the steps,
leading with the outcome. Mention failures plainly if any step failed.
Output only the summary text."#,
    )
}

/// User message for one step: goal, all prior step results, and the
/// step description.
pub fn step_message(goal: &str, prior_results: &[String], step: &PlanStep) -> String {
    let context = if prior_results.is_empty() {
        "No steps have run yet.".to_string()
    } else {
        prior_results.join("\n\n")
    };

    format!(
        "Overall goal: {}\n\nResults so far:\n{}\n\nNow perform step {}: {}",
        goal, context, step.number, step.description
    )
}

/// User message for the synthesis session.
pub fn synthesis_message(goal: &str, step_results: &[String]) -> String {
    format!(
        "Goal: {}\n\nStep results:\n{}",
        goal,
        step_results.join("\n\n")
    )
}
