use std::io::IsTerminal;

use chrono::{Duration, Utc};
use owo_colors::OwoColorize;

use crate::gpa::CalculationResult;
use crate::history::{HistoryEntry, StorageScope};
use crate::table::Diagnostic;

const COURSE_WIDTH: usize = 30;

/// Averages are shown with two decimals
pub fn format_average(value: f64) -> String {
    format!("{:.2}", value)
}

/// Grade points are shown with one decimal
pub fn format_grade_point(value: f64) -> String {
    format!("{:.1}", value)
}

/// Truncate a course name to fit the column, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a calculation: one line per course, then the weighted averages.
pub fn format_result(result: &CalculationResult, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let header = format!("Courses from {}", result.source_label);
    if use_colors {
        lines.push(header.bold().to_string());
    } else {
        lines.push(header);
    }

    for (idx, course) in result.per_course_grade_points.iter().enumerate() {
        let index_str = format!("{:>2}.", idx + 1);
        let name = format!(
            "{:<width$}",
            truncate_name(&course.course, COURSE_WIDTH),
            width = COURSE_WIDTH
        );
        let score = format!("{:>6}", format_average(course.score));
        let credit = format!("{:>4}", course.credit);
        let gp = format_grade_point(course.grade_point);
        if use_colors {
            lines.push(format!(
                "{} {}  {}  {}  {}",
                index_str.dimmed(),
                name,
                score,
                credit.dimmed(),
                gp.cyan()
            ));
        } else {
            lines.push(format!("{} {}  {}  {}  {}", index_str, name, score, credit, gp));
        }
    }

    lines.push(String::new());
    let score = format_average(result.weighted_average_score);
    let gpa = format_average(result.weighted_average_grade_point);
    if use_colors {
        lines.push(format!("Weighted average score:       {}", score.bold()));
        lines.push(format!("Weighted average grade point: {}", gpa.bold().green()));
    } else {
        lines.push(format!("Weighted average score:       {}", score));
        lines.push(format!("Weighted average grade point: {}", gpa));
    }
    lines.push(format!(
        "Total credits: {}  Courses: {}",
        result.total_credits,
        result.course_count()
    ));

    lines.join("\n")
}

/// Format skipped rows, one per line
pub fn format_diagnostics(diagnostics: &[Diagnostic], use_colors: bool) -> String {
    if diagnostics.is_empty() {
        return String::new();
    }

    let header = format!("Skipped {} row(s):", diagnostics.len());
    let mut lines = vec![if use_colors {
        header.yellow().to_string()
    } else {
        header
    }];
    lines.extend(diagnostics.iter().map(|d| format!("  - {}", d)));
    lines.join("\n")
}

/// Format history as a list, oldest first, numbered for reference
pub fn format_history_list(
    entries: &[HistoryEntry],
    scope: StorageScope,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();

    if scope == StorageScope::Fallback {
        let note = "Showing history from the temporary fallback location only.";
        lines.push(if use_colors {
            note.yellow().to_string()
        } else {
            note.to_string()
        });
    }

    if entries.is_empty() {
        lines.push("No saved calculations.".to_string());
        return lines.join("\n");
    }

    for (idx, entry) in entries.iter().enumerate() {
        let index_str = format!("{:>2}.", idx + 1);
        let age = format_age(Utc::now() - entry.saved_at);
        let gpa = format_average(entry.result.weighted_average_grade_point);
        let score = format_average(entry.result.weighted_average_score);
        if use_colors {
            lines.push(format!(
                "{} {}  {:>6}  {:>5}  {:>4}  {}",
                index_str.dimmed(),
                entry.short_id().dimmed(),
                score,
                gpa.bold(),
                age,
                entry.result.source_label
            ));
        } else {
            lines.push(format!(
                "{} {}  {:>6}  {:>5}  {:>4}  {}",
                index_str,
                entry.short_id(),
                score,
                gpa,
                age,
                entry.result.source_label
            ));
        }
    }

    lines.join("\n")
}

/// Format one history entry in full
pub fn format_entry_detail(entry: &HistoryEntry, use_colors: bool) -> String {
    let mut out = format!(
        "Entry {}\n  Saved: {}\n  Calculated: {}\n",
        entry.id,
        entry.saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    if entry.result.skipped_rows > 0 {
        out.push_str(&format!(
            "  Skipped rows: {}\n",
            entry.result.skipped_rows
        ));
    }
    out.push('\n');
    out.push_str(&format_result(&entry.result, use_colors));
    out
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}
