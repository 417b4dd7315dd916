//! Terminal output formatting with colors and tables
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;
use tabled::builder::Builder;
use tabled::settings::object::Segment;
use tabled::settings::{Alignment, Style};

use crate::application::services::{NodeRow, RunningBuildRow};
use crate::domain::JobInfo;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print plain output (no color, for names and status lines)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Render an ASCII table with a header row, left aligned.
pub fn render_table<R>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table
        .with(Style::ascii())
        .modify(Segment::all(), Alignment::left());
    table.to_string()
}

/// Table of `nodes-list`.
pub fn nodes_table(rows: &[NodeRow]) -> String {
    render_table(
        &["Name", "Labels", "Executors", "Offline"],
        rows.iter().map(|row| {
            vec![
                row.name.clone(),
                row.labels.iter().join(", "),
                row.executors.to_string(),
                bool_label(row.offline).to_string(),
            ]
        }),
    )
}

/// Table of `jobs-failing`.
pub fn failing_table(jobs: &[JobInfo]) -> String {
    render_table(
        &["Name", "Score", "URL"],
        jobs.iter().map(|job| {
            vec![
                job.name.clone(),
                job.health_score()
                    .map(|score| score.to_string())
                    .unwrap_or_default(),
                job.url.clone(),
            ]
        }),
    )
}

/// Table of `jobs-unstable`.
pub fn unstable_table(jobs: &[JobInfo]) -> String {
    render_table(
        &["Name", "URL"],
        jobs.iter().map(|job| vec![job.name.clone(), job.url.clone()]),
    )
}

/// Table of `builds-running`.
pub fn running_builds_table(rows: &[RunningBuildRow]) -> String {
    render_table(
        &["Name", "Started at", "Url", "Worker"],
        rows.iter().map(|row| {
            vec![
                row.full_display_name.clone(),
                row.started_label(),
                row.url.clone(),
                row.built_on.clone(),
            ]
        }),
    )
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
