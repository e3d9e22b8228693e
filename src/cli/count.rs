//! tasktracker count command implementation

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, progress_bar, HumanOutput, OutputOptions};
use crate::progress::{ProgressResult, DEFAULT_COLORS};
use crate::task::{self, TaskLine};

/// Options for `tasktracker count`
pub struct CountOptions {
    pub file: PathBuf,
    pub lines: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct CountReport {
    file: PathBuf,
    incomplete: usize,
    completed: usize,
    percentage: u8,
    color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lines: Vec<TaskLine>,
}

pub fn run(options: CountOptions) -> Result<()> {
    let text = std::fs::read_to_string(&options.file).map_err(|source| Error::Read {
        path: options.file.display().to_string(),
        source,
    })?;

    let counts = if options.lines {
        task::parse_with_lines(&text)
    } else {
        task::parse(&text)
    };
    let colors: Vec<String> = DEFAULT_COLORS.iter().map(|c| c.to_string()).collect();
    let progress = ProgressResult::compute(&counts, &colors);

    let mut human = HumanOutput::new(format!(
        "tasktracker count: {}",
        progress_bar(progress.percentage, 20)
    ));
    human.push_summary("incomplete", counts.incomplete.to_string());
    human.push_summary("completed", counts.completed.to_string());
    human.push_summary("color", progress.color.clone());
    for line in &counts.lines {
        let mark = if line.completed { "x" } else { " " };
        human.push_detail(format!("{}: [{mark}] {}", line.line, line.content));
    }
    if counts.is_empty() {
        human.push_warning("no checkbox tasks found");
    }

    let report = CountReport {
        file: options.file,
        incomplete: counts.incomplete,
        completed: counts.completed,
        percentage: progress.percentage,
        color: progress.color,
        lines: counts.lines,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "count",
        &report,
        Some(&human),
    )
}
