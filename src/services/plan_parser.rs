//! Plan parsing.
//!
//! Two pure entry points: a strict tag parser for the structured block
//! the planning prompt asks for, and a lenient fallback that extracts
//! list items from free-form prose. Neither ever fails with an error;
//! unusable input yields `None`.
//!
//! Expected structured shape:
//!
//! ```text
//! <plan>
//! <goal>Summarize overnight alerts</goal>
//! <step>Collect the alerts</step>
//! <step>Group them by service</step>
//! </plan>
//! ```

use crate::domain::models::Plan;

/// Plans are capped at this many steps; extra steps are discarded in
/// document order.
pub const MAX_PLAN_STEPS: usize = 5;

/// Strict parser for a `<plan>` block.
///
/// Returns `None` when there is no complete block, the goal is absent
/// or blank, or no non-blank steps remain. Blank steps are dropped and
/// the kept steps are renumbered contiguously from 1.
pub fn parse(raw: &str) -> Option<Plan> {
    let start = raw.find("<plan>")?;
    let body = &raw[start + "<plan>".len()..];
    let end = body.find("</plan>")?;
    let block = &body[..end];

    let goal = extract_tag(block, "goal")?.trim().to_string();
    if goal.is_empty() {
        return None;
    }

    let mut steps = Vec::new();
    let mut rest = block;
    while let Some(open) = rest.find("<step>") {
        let tail = &rest[open + "<step>".len()..];
        let Some(close) = tail.find("</step>") else {
            break;
        };
        let description = tail[..close].trim();
        if !description.is_empty() {
            steps.push(description.to_string());
        }
        rest = &tail[close + "</step>".len()..];
    }

    if steps.is_empty() {
        return None;
    }
    steps.truncate(MAX_PLAN_STEPS);
    Some(Plan::new(goal, steps))
}

/// Lenient fallback over free-form prose.
///
/// Scans lines for numbered markers (`1.`, `1)`) or bullets (`- `,
/// `* `) in document order and uses them as step descriptions with
/// `goal_fallback` as the goal. `None` when no list items are found.
pub fn parse_fallback(raw: &str, goal_fallback: &str) -> Option<Plan> {
    let mut steps = Vec::new();
    for line in raw.lines() {
        if let Some(item) = strip_list_marker(line.trim_start()) {
            let item = item.trim();
            if !item.is_empty() {
                steps.push(item.to_string());
            }
        }
    }

    if steps.is_empty() {
        return None;
    }
    steps.truncate(MAX_PLAN_STEPS);
    Some(Plan::new(goal_fallback, steps))
}

/// Contents of the first `<tag>…</tag>` pair, if present.
fn extract_tag<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(&block[start..end])
}

/// Strip a leading list marker from a trimmed line, if it has one.
fn strip_list_marker(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        return rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'));
    }
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}
