//! Table and status rendering helpers.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use console::style;

use crate::domain::models::{Bot, BotStatus, RunLogEntry};

/// Render a bot list as a table.
pub fn bot_table(bots: &[Bot]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Schedule", "Status", "Runs", "Next run"]);

    for bot in bots {
        table.add_row(vec![
            Cell::new(short_id(bot)),
            Cell::new(&bot.name),
            Cell::new(bot.schedule.description()),
            Cell::new(status_label(bot.status)),
            Cell::new(bot.run_count),
            Cell::new(
                bot.next_run_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table
}

/// Render recent log entries, oldest first.
pub fn log_lines(entries: &[RunLogEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries.iter().rev() {
        lines.push(format!(
            "[{}] run {:>3} {} {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.run_number,
            entry.level.padded(),
            entry.message
        ));
        if let Some(detail) = &entry.detail {
            for detail_line in detail.lines() {
                lines.push(format!("    {}", detail_line));
            }
        }
    }
    lines.join("\n")
}

fn short_id(bot: &Bot) -> String {
    bot.id.to_string().chars().take(8).collect()
}

fn status_label(status: BotStatus) -> String {
    match status {
        BotStatus::Running => style(status.as_str()).green().to_string(),
        BotStatus::Failed => style(status.as_str()).red().to_string(),
        BotStatus::Stopped | BotStatus::Completed => style(status.as_str()).dim().to_string(),
        _ => status.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LogLevel, ScheduleKind};
    use uuid::Uuid;

    #[test]
    fn test_bot_table_renders() {
        let bots =
            vec![Bot::new("watcher", "watch").with_schedule(ScheduleKind::Interval { minutes: 5 })];
        let rendered = bot_table(&bots).to_string();
        assert!(rendered.contains("watcher"));
        assert!(rendered.contains("every 5 minute(s)"));
    }

    #[test]
    fn test_log_lines_oldest_first() {
        let bot_id = Uuid::new_v4();
        // list_logs returns newest first; rendering flips the order
        let entries = vec![
            RunLogEntry::new(bot_id, 2, LogLevel::Info, "newer"),
            RunLogEntry::new(bot_id, 1, LogLevel::Info, "older"),
        ];
        let rendered = log_lines(&entries);
        let newer_pos = rendered.find("newer").unwrap();
        let older_pos = rendered.find("older").unwrap();
        assert!(older_pos < newer_pos);
    }
}
