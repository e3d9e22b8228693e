//! Shared output formatting for tasktracker CLI commands.

use serde::Serialize;

use crate::error::Result;
use crate::indicator::{
    derive_id, ElementRegistry, Surface, CONTAINER_CLASS, ERROR_CLASS, LABEL_BASE_ID,
    PROGRESSION_BAR_BASE_ID, PROGRESSION_TEXT_BASE_ID,
};

pub const SCHEMA_VERSION: &str = "tasktracker.v1";

const FILLED: char = '█';
const EMPTY: char = '░';

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .unwrap_or_else(|| "tasktracker".to_string())
}

/// Draw a text bar such as `[██████░░░░░░░░░░░░░░] 33%`.
pub fn progress_bar(percentage: u8, cells: usize) -> String {
    let clamped = usize::from(percentage.min(100));
    let filled = clamped * cells / 100;
    format!(
        "[{}{}] {percentage}%",
        std::iter::repeat(FILLED).take(filled).collect::<String>(),
        std::iter::repeat(EMPTY).take(cells - filled).collect::<String>(),
    )
}

/// Render the indicator for `document` from the elements on `surface`.
///
/// Reads back the bar width and color exactly as the engine left them.
pub fn render_indicator(surface: &ElementRegistry, document: &str, cells: usize) -> Option<String> {
    let bar = surface.get(&derive_id(PROGRESSION_BAR_BASE_ID, document))?;
    let percentage = bar
        .style
        .width
        .as_deref()
        .and_then(|width| width.trim_end_matches('%').parse::<u8>().ok())
        .unwrap_or(0);
    let color = bar.style.background_color.as_deref().unwrap_or("");

    let title = surface
        .get(&derive_id(LABEL_BASE_ID, document))
        .and_then(|label| label.text.clone())
        .unwrap_or_else(|| document.to_string());
    let text = surface
        .get(&derive_id(PROGRESSION_TEXT_BASE_ID, document))
        .and_then(|text| text.text.clone());

    let mut line = format!("{title}  {}", progress_bar(percentage, cells));
    if let Some(text) = text.filter(|text| *text != format!("{percentage}%")) {
        line.push_str(&format!(" ({text})"));
    }
    if !color.is_empty() {
        line.push_str(&format!(" {color}"));
    }
    Some(line)
}

/// Render every indicator and error placeholder on the surface, in order.
pub fn render_surface(surface: &ElementRegistry, cells: usize) -> Vec<String> {
    surface
        .children(None)
        .filter_map(|element| {
            if element.class.as_deref() == Some(ERROR_CLASS) {
                return element.text.clone();
            }
            if element.class.as_deref() != Some(CONTAINER_CLASS) {
                return None;
            }
            render_indicator(surface, element.document.as_deref()?, cells)
        })
        .collect()
}

fn error_kind(err: &crate::error::Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerSettings;
    use crate::indicator;
    use crate::progress::ProgressResult;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 4), "[░░░░] 0%");
        assert_eq!(progress_bar(50, 4), "[██░░] 50%");
        assert_eq!(progress_bar(100, 4), "[████] 100%");
        assert_eq!(progress_bar(33, 10), "[███░░░░░░░] 33%");
    }

    #[test]
    fn render_surface_lists_indicators_and_errors() {
        let mut surface = ElementRegistry::new();
        indicator::render(
            &mut surface,
            "Sprint 12",
            None,
            &TrackerSettings::default(),
            &ProgressResult {
                percentage: 50,
                color: "#D08770".to_string(),
            },
        );
        indicator::render_error(&mut surface, "1", "File name is not provided");

        let lines = render_surface(&surface, 4);
        assert_eq!(
            lines,
            vec![
                "Sprint 12  [██░░] 50% #D08770".to_string(),
                "TaskTrackerError: File name is not provided".to_string(),
            ]
        );
    }

    #[test]
    fn render_indicator_prefers_label() {
        let mut surface = ElementRegistry::new();
        indicator::render(
            &mut surface,
            "Todo",
            Some("Chores"),
            &TrackerSettings::default(),
            &ProgressResult {
                percentage: 100,
                color: "#A3BE8C".to_string(),
            },
        );
        let line = render_indicator(&surface, "Todo", 2).expect("line");
        assert_eq!(line, "Chores  [██] 100% #A3BE8C");
    }

    #[test]
    fn format_human_omits_empty_sections() {
        let human = HumanOutput::new("tasktracker show: 0 trackers");
        assert_eq!(format_human(&human), "tasktracker show: 0 trackers");
    }
}
