//! Completion percentage and color banding.

use serde::Serialize;

use crate::task::TaskCounts;

pub const RED: &str = "#BF616A";
pub const ORANGE: &str = "#D08770";
pub const YELLOW: &str = "#EBCB8B";
pub const GREEN: &str = "#A3BE8C";

/// Default palette, lowest completion first.
pub const DEFAULT_COLORS: [&str; 4] = [RED, ORANGE, YELLOW, GREEN];

/// Color used for every band when no colors are configured.
pub const FALLBACK_COLOR: &str = GREEN;

/// Number of color bands.
pub const MAX_BANDS: usize = 4;

/// Percentage and display color computed from one parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressResult {
    pub percentage: u8,
    pub color: String,
}

impl ProgressResult {
    pub fn compute(counts: &TaskCounts, colors: &[String]) -> Self {
        let percentage = percentage(counts);
        Self {
            percentage,
            color: color_for(percentage, colors).to_string(),
        }
    }

    /// Text shown next to the bar, e.g. `33%`.
    pub fn label(&self) -> String {
        format!("{}%", self.percentage)
    }
}

/// Floor of `completed / total * 100`. No tasks at all is 0%.
pub fn percentage(counts: &TaskCounts) -> u8 {
    let total = counts.total();
    if total == 0 {
        return 0;
    }
    let ratio = counts.completed.min(total) * 100 / total;
    ratio as u8
}

/// The four completion bands, with inclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    /// 0..=25
    Low,
    /// 26..=50
    Mid,
    /// 51..=99
    High,
    /// 100 and above
    Complete,
}

impl Band {
    pub fn for_percentage(percentage: u8) -> Self {
        match percentage {
            0..=25 => Band::Low,
            26..=50 => Band::Mid,
            51..=99 => Band::High,
            _ => Band::Complete,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Pick the band color for `percentage`.
///
/// Missing bands cascade upward: band 0 falls back to [`FALLBACK_COLOR`],
/// and each higher band falls back to the resolved color of the band below.
pub fn color_for(percentage: u8, colors: &[String]) -> &str {
    let mut resolved: [&str; MAX_BANDS] = [FALLBACK_COLOR; MAX_BANDS];
    for band in 0..MAX_BANDS {
        resolved[band] = match colors.get(band) {
            Some(color) => color.as_str(),
            None if band == 0 => FALLBACK_COLOR,
            None => resolved[band - 1],
        };
    }
    resolved[Band::for_percentage(percentage).index()]
}
