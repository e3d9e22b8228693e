//! Checkbox task extraction
//!
//! Lines are classified by substring containment, not by anchored matching:
//! a line holding `- [ ]` counts as incomplete, a line holding `- [x]` or
//! `- [X]` counts as completed, and a line holding both counts in both
//! buckets. Lines without a marker are ignored.

use serde::Serialize;

/// Marker of an open checkbox.
pub const TASK_TODO: &str = "- [ ]";
/// Marker of a checked checkbox, lowercase form.
pub const TASK_DONE_LOWER: &str = "- [x]";
/// Marker of a checked checkbox, uppercase form.
pub const TASK_DONE_UPPER: &str = "- [X]";

/// A single task line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskLine {
    pub line: usize,
    pub content: String,
    pub completed: bool,
}

/// Aggregate task counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub incomplete: usize,
    pub completed: usize,
    /// Per-line detail, only filled by `parse_with_lines`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<TaskLine>,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.incomplete + self.completed
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// How a single line was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineClass {
    pub incomplete: bool,
    pub completed: bool,
}

impl LineClass {
    pub fn of(line: &str) -> Self {
        Self {
            incomplete: line.contains(TASK_TODO),
            completed: line.contains(TASK_DONE_LOWER) || line.contains(TASK_DONE_UPPER),
        }
    }

    pub fn is_task(self) -> bool {
        self.incomplete || self.completed
    }
}

/// Count task lines in `text`. The `lines` detail stays empty.
pub fn parse(text: &str) -> TaskCounts {
    scan(text, false)
}

/// Count task lines in `text` and record each task line.
pub fn parse_with_lines(text: &str) -> TaskCounts {
    scan(text, true)
}

fn scan(text: &str, collect_lines: bool) -> TaskCounts {
    let mut counts = TaskCounts::default();

    for (index, line) in text.lines().enumerate() {
        let class = LineClass::of(line);
        if class.incomplete {
            counts.incomplete += 1;
        }
        if class.completed {
            counts.completed += 1;
        }
        if collect_lines && class.is_task() {
            counts.lines.push(TaskLine {
                line: index + 1,
                content: strip_markers(line),
                completed: class.completed,
            });
        }
    }

    counts
}

fn strip_markers(line: &str) -> String {
    line.replacen(TASK_TODO, "", 1)
        .replacen(TASK_DONE_LOWER, "", 1)
        .replacen(TASK_DONE_UPPER, "", 1)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_tasks() {
        let counts = parse("");
        assert_eq!(counts, TaskCounts::default());
        assert!(counts.is_empty());
    }

    #[test]
    fn counts_open_and_checked_markers() {
        let text = "# Sprint\n- [ ] a\n- [x] b\n- [X] c\nplain line\n- [ ] d\n";
        let counts = parse(text);
        assert_eq!(counts.incomplete, 2);
        assert_eq!(counts.completed, 2);
        assert!(counts.lines.is_empty());
    }

    #[test]
    fn trailing_newline_is_not_a_line() {
        let with = parse_with_lines("- [ ] a\n");
        let without = parse_with_lines("- [ ] a");
        assert_eq!(with, without);
        assert_eq!(with.lines.len(), 1);
    }

    #[test]
    fn markers_match_anywhere_in_line() {
        let counts = parse("    - [ ] nested\n> - [x] quoted\n1. - [X] numbered\n");
        assert_eq!(counts.incomplete, 1);
        assert_eq!(counts.completed, 2);
    }

    #[test]
    fn line_with_both_markers_counts_twice() {
        let counts = parse("- [ ] open - [x] done\n");
        assert_eq!(counts.incomplete, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn repeated_marker_in_one_line_counts_once() {
        let counts = parse("- [x] - [X] twice\n");
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.incomplete, 0);
    }

    #[test]
    fn unmarked_lines_are_ignored() {
        let counts = parse("-[ ] no space\n- [] empty\n* [ ] star bullet\n");
        assert!(counts.is_empty());
    }

    #[test]
    fn lines_carry_number_content_and_state() {
        let text = "intro\n- [ ] write docs \r\n- [x] ship it\n";
        let counts = parse_with_lines(text);
        assert_eq!(
            counts.lines,
            vec![
                TaskLine {
                    line: 2,
                    content: "write docs".to_string(),
                    completed: false,
                },
                TaskLine {
                    line: 3,
                    content: "ship it".to_string(),
                    completed: true,
                },
            ]
        );
    }

    #[test]
    fn counts_match_with_or_without_lines() {
        let text = "- [ ] a\n- [x] b\n- [ ] c\n";
        let plain = parse(text);
        let detailed = parse_with_lines(text);
        assert_eq!(plain.incomplete, detailed.incomplete);
        assert_eq!(plain.completed, detailed.completed);
    }
}
