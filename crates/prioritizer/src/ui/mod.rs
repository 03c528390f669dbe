//! Terminal UI helpers for run output.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

use chrono::DateTime;
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::domain::{ListOutcome, RunReport};
use crate::entities::{Task, TaskStatus};

/// Get colored status string
pub fn status_colored(status: TaskStatus) -> String {
    match status {
        TaskStatus::NeedsAction => "needsAction".yellow().to_string(),
        TaskStatus::Completed => "completed".green().to_string(),
    }
}

/// Render an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS`, or return it
/// unchanged if it does not parse.
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Summary table with one row per target list
pub fn report_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("List").fg(Color::Cyan),
        Cell::new("Outcome").fg(Color::Cyan),
        Cell::new("Moves").fg(Color::Cyan),
        Cell::new("Subtasks").fg(Color::Cyan),
    ]);

    for entry in &report.lists {
        let (color, moves, subtasks, detail) = match &entry.outcome {
            ListOutcome::Completed {
                moved,
                subtasks_created,
            } => (
                Color::Green,
                moved.to_string(),
                subtasks_created.to_string(),
                String::new(),
            ),
            ListOutcome::Skipped { reason } => {
                (Color::Yellow, "-".to_string(), "-".to_string(), reason.clone())
            }
            ListOutcome::Failed { error } => {
                (Color::Red, "-".to_string(), "-".to_string(), error.to_string())
            }
        };

        let outcome = if detail.is_empty() {
            entry.outcome.label().to_string()
        } else {
            format!("{}: {detail}", entry.outcome.label())
        };

        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(outcome).fg(color),
            Cell::new(moves),
            Cell::new(subtasks),
        ]);
    }

    table
}

/// Print the tasks of one list after the run.
pub fn display_list(title: &str, tasks: &[Task]) {
    println!();
    println!("{} {}", "List:".cyan().bold(), title.bold());
    println!("{}", "─".repeat(60).dimmed());

    if tasks.is_empty() {
        println!("  {}", "No tasks in this list".dimmed());
        return;
    }

    for task in tasks {
        display_task_info(task);
    }
}

/// Display one task's fields
pub fn display_task_info(task: &Task) {
    let indent = if task.is_top_level() { "" } else { "  " };

    println!("{indent}{} {}", "•".dimmed(), task.title.bold());
    println!("{indent}  {}: {}", "ID".dimmed(), task.id);
    println!("{indent}  {}: {}", "Status".dimmed(), status_colored(task.status));

    if let Some(ref due) = task.due {
        println!("{indent}  {}: {}", "Due".dimmed(), format_timestamp(due));
    }
    if let Some(ref notes) = task.notes {
        println!("{indent}  {}: {}", "Notes".dimmed(), notes);
    }
    if let Some(ref completed) = task.completed {
        println!("{indent}  {}: {}", "Completed".dimmed(), format_timestamp(completed));
    }
    if !task.parent.is_empty() {
        println!("{indent}  {}: {}", "Parent".dimmed(), task.parent);
    }
    if !task.position.is_empty() {
        println!("{indent}  {}: {}", "Position".dimmed(), task.position);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListReport;
    use crate::errors::PrioritizerError;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp("2024-06-01T00:00:00.000Z"),
            "2024-06-01 00:00:00"
        );
        assert_eq!(format_timestamp("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_report_table_rows() {
        let report = RunReport {
            lists: vec![
                ListReport {
                    title: "Backlog".to_string(),
                    outcome: ListOutcome::Completed {
                        moved: 4,
                        subtasks_created: 2,
                    },
                },
                ListReport {
                    title: "In Progress".to_string(),
                    outcome: ListOutcome::Failed {
                        error: PrioritizerError::ListNotFound {
                            title: "In Progress".to_string(),
                        },
                    },
                },
            ],
        };

        let rendered = report_table(&report).to_string();
        assert!(rendered.contains("Backlog"));
        assert!(rendered.contains("completed"));
        assert!(rendered.contains("failed: Task list 'In Progress' not found"));
    }
}
