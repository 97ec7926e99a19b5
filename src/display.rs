//! Terminal rendering of statistics snapshots

use colored::*;
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{DayCell, DayStatus, StatsSnapshot};

const TRAINED_MARK: &str = "●";
const REST_MARK: &str = "○";
const NEUTRAL_MARK: &str = "·";

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Sessions")]
    sessions: u32,
    #[tabled(rename = "Goal")]
    goal: String,
}

fn plural(count: u32, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

fn week_marker(cell: &DayCell) -> ColoredString {
    if cell.trained {
        TRAINED_MARK.green().bold()
    } else if cell.is_rest {
        REST_MARK.red()
    } else {
        NEUTRAL_MARK.dimmed()
    }
}

/// Headline figures: goal progress, streaks and monthly count
pub fn render_summary(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();

    let progress = format!(
        "{}/{}",
        snapshot.completed_this_week, snapshot.weekly_goal
    );
    let progress = if snapshot.completed_this_week >= snapshot.weekly_goal.max(1) {
        progress.green().bold()
    } else {
        progress.yellow().bold()
    };

    let _ = writeln!(out, "{} {} sessions this week", "Weekly goal:".bold(), progress);
    let _ = writeln!(
        out,
        "{} {}",
        "Current streak:".bold(),
        plural(snapshot.current_streak, "week").cyan()
    );
    let _ = writeln!(
        out,
        "{} {}",
        "Best streak:".bold(),
        plural(snapshot.best_streak, "week").cyan()
    );
    let _ = writeln!(
        out,
        "{} {}",
        "This month:".bold(),
        plural(snapshot.completed_this_month, "session")
    );

    if snapshot.undated_sessions > 0 {
        let _ = writeln!(
            out,
            "{}",
            format!(
                "{} of {} sessions have no usable completion time and were skipped",
                snapshot.undated_sessions, snapshot.total_sessions
            )
            .dimmed()
        );
    }

    out
}

/// Monday-to-Sunday strip with one marker per day and the trained sessions
pub fn render_week_strip(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();

    let labels: Vec<String> = snapshot
        .week_days
        .iter()
        .map(|cell| format!("{:^5}", cell.weekday_label))
        .collect();
    let _ = writeln!(out, "{}", labels.join("").bold());

    let days: Vec<String> = snapshot
        .week_days
        .iter()
        .map(|cell| format!("{:^5}", cell.day_of_month))
        .collect();
    let _ = writeln!(out, "{}", days.join("").dimmed());

    let marks: Vec<String> = snapshot
        .week_days
        .iter()
        .map(|cell| format!("  {}  ", week_marker(cell)))
        .collect();
    let _ = writeln!(out, "{}", marks.join(""));

    for cell in snapshot.week_days.iter().filter(|cell| cell.trained) {
        let time = cell
            .workout_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} {} {}",
            cell.weekday_label.bold(),
            cell.workout_label.as_deref().unwrap_or("Workout"),
            time.dimmed()
        );
    }

    out
}

fn month_cell(cell: &DayCell) -> String {
    let day = format!("{:>3}", cell.day_of_month);
    match cell.status {
        Some(DayStatus::Trained) if cell.is_outside_month => day.green().dimmed().to_string(),
        Some(DayStatus::Trained) => day.green().bold().to_string(),
        Some(DayStatus::Rest) => day.red().to_string(),
        _ => day.dimmed().to_string(),
    }
}

/// Month calendar, one row per week, trained days highlighted
pub fn render_month_grid(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();

    if let Some(first) = snapshot.month_days.iter().find(|cell| !cell.is_outside_month) {
        let _ = writeln!(out, "{}", first.date.format("%B %Y").to_string().bold());
    }

    let header: Vec<String> = snapshot
        .month_days
        .iter()
        .take(7)
        .map(|cell| format!("{:>3}", cell.weekday_label.chars().take(2).collect::<String>()))
        .collect();
    let _ = writeln!(out, "{}", header.join(" ").bold());

    for week in snapshot.month_days.chunks(7) {
        let row: Vec<String> = week.iter().map(month_cell).collect();
        let _ = writeln!(out, "{}", row.join(" "));
    }

    out
}

/// Table of recent weeks with their goal status
pub fn render_recent_weeks(snapshot: &StatsSnapshot) -> String {
    let rows: Vec<WeekRow> = snapshot
        .recent_weeks
        .iter()
        .map(|week| WeekRow {
            week: week.week_key.clone(),
            starts: week.week_start.format("%Y-%m-%d").to_string(),
            sessions: week.sessions,
            goal: if week.goal_met { "met" } else { "-" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
