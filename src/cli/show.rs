//! tasktracker show command implementation
//!
//! Mounts every tracker block of a note on a fresh surface and prints the
//! result once.

use serde::Serialize;

use super::HostContext;
use crate::block::extract_blocks;
use crate::error::Result;
use crate::events::EventKind;
use crate::indicator::ElementRegistry;
use crate::output::{emit_success, render_surface, HumanOutput, OutputOptions};
use crate::refresh::{mount_block, ChangeHub};
use crate::store::{DocumentRef, DocumentStore};

/// Options for `tasktracker show`
pub struct ShowOptions {
    pub note: String,
    pub json: bool,
    pub quiet: bool,
}

/// Outcome of mounting one block.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BlockReport {
    pub index: usize,
    pub start_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct ShowReport {
    note: String,
    blocks: Vec<BlockReport>,
    lines: Vec<String>,
}

/// Read `note`, then mount each of its tracker blocks on `surface`.
pub(crate) fn mount_note(
    host: &mut HostContext,
    note: &DocumentRef,
    surface: &mut ElementRegistry,
    hub: &mut ChangeHub,
) -> Result<Vec<BlockReport>> {
    let text = host.vault.read(note)?;
    let blocks = extract_blocks(&text, &host.config.block.tag);

    let mut reports = Vec::with_capacity(blocks.len());
    for block in blocks {
        let report = match mount_block(&block.key(), &block.source, &host.vault, surface, hub) {
            Ok(mounted) => {
                let document = hub
                    .get(mounted.subscription)
                    .and_then(|tracker| tracker.document())
                    .map(|doc| doc.path.clone());
                host.emit(
                    EventKind::TrackerRendered,
                    document.as_deref(),
                    &mounted.handle,
                );
                BlockReport {
                    index: block.index,
                    start_line: block.start_line,
                    document,
                    percentage: Some(mounted.handle.percentage),
                    color: Some(mounted.handle.color),
                    error: None,
                }
            }
            Err(err) => {
                host.emit(
                    EventKind::MountFailed,
                    Some(&note.path),
                    serde_json::json!({
                        "block": block.index,
                        "line": block.start_line,
                        "error": err.to_string(),
                    }),
                );
                BlockReport {
                    index: block.index,
                    start_line: block.start_line,
                    document: None,
                    percentage: None,
                    color: None,
                    error: Some(err.to_string()),
                }
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

pub fn run(mut host: HostContext, options: ShowOptions) -> Result<()> {
    let note = host.note(&options.note)?;
    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();

    let blocks = mount_note(&mut host, &note, &mut surface, &mut hub)?;
    let lines = render_surface(&surface, host.config.render.bar_cells);

    let mut human = HumanOutput::new(format!(
        "tasktracker show: {} ({} trackers)",
        note,
        blocks.len()
    ));
    for line in &lines {
        human.push_detail(line.clone());
    }
    if blocks.is_empty() {
        human.push_warning(format!(
            "no `{}` blocks found",
            host.config.block.tag
        ));
    }

    let report = ShowReport {
        note: note.path.clone(),
        blocks,
        lines,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &report,
        Some(&human),
    )
}
