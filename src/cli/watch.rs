//! tasktracker watch command implementation
//!
//! Mounts the note's tracker blocks, then feeds every vault change to the
//! subscription hub. A change to the host note itself throws the surface
//! away and mounts again, the way an editor re-renders a note.

use serde::Serialize;
use tracing::{error, info};

use super::show::mount_note;
use super::HostContext;
use crate::error::Result;
use crate::events::EventKind;
use crate::indicator::ElementRegistry;
use crate::output::{emit_success, render_indicator, render_surface, HumanOutput, OutputOptions};
use crate::refresh::{ChangeHub, RefreshOutcome};
use crate::store::DocumentRef;
use crate::watch::{Change, ChangeFeed};

/// Options for `tasktracker watch`
pub struct WatchOptions {
    pub note: String,
    pub max_events: Option<usize>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct RefreshReport<'a> {
    document: &'a str,
    #[serde(flatten)]
    outcome: &'a RefreshOutcome,
}

#[derive(Serialize)]
struct RemountReport {
    note: String,
    trackers: usize,
    lines: Vec<String>,
}

pub fn run(mut host: HostContext, options: WatchOptions) -> Result<()> {
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };
    let note = host.note(&options.note)?;
    let cells = host.config.render.bar_cells;

    let feed = ChangeFeed::start(&host.vault, host.config.watch.recursive)?;

    let mut surface = ElementRegistry::new();
    let mut hub = ChangeHub::new();
    mount_and_print(&mut host, &note, &mut surface, &mut hub, output)?;

    let mut seen = 0usize;
    while options.max_events.map_or(true, |max| seen < max) {
        let Some(change) = feed.recv() else {
            break;
        };
        let changed = match change {
            Change::Document(document) => document,
            Change::Error(err) => {
                error!(error = %err, "watch error");
                continue;
            }
        };
        seen += 1;

        if changed == note {
            info!(note = %note, "host note changed, remounting");
            surface = ElementRegistry::new();
            hub.clear();
            if let Err(err) = mount_and_print(&mut host, &note, &mut surface, &mut hub, output) {
                error!(error = %err, "remount failed");
            }
            continue;
        }

        for (_, outcome) in hub.notify(&changed, &host.vault, &mut surface) {
            let (kind, line) = match &outcome {
                RefreshOutcome::Updated { .. } => (
                    EventKind::TrackerUpdated,
                    render_indicator(&surface, changed.basename(), cells),
                ),
                RefreshOutcome::Stale { id } => {
                    (EventKind::TrackerStale, Some(format!("{changed}: {id} not on surface")))
                }
                RefreshOutcome::Failed { message } => {
                    (EventKind::RefreshFailed, Some(format!("{changed}: {message}")))
                }
                RefreshOutcome::Ignored => continue,
            };
            host.emit(kind, Some(&changed.path), &outcome);

            let mut human = HumanOutput::new(format!("tasktracker watch: {changed}"));
            if let Some(line) = line {
                human.push_detail(line);
            }
            emit_success(
                output,
                "watch",
                &RefreshReport {
                    document: &changed.path,
                    outcome: &outcome,
                },
                Some(&human),
            )?;
        }
    }

    Ok(())
}

fn mount_and_print(
    host: &mut HostContext,
    note: &DocumentRef,
    surface: &mut ElementRegistry,
    hub: &mut ChangeHub,
    output: OutputOptions,
) -> Result<()> {
    mount_note(host, note, surface, hub)?;
    let lines = render_surface(surface, host.config.render.bar_cells);

    let mut human = HumanOutput::new(format!(
        "tasktracker watch: {note} ({} subscribed)",
        hub.len()
    ));
    for line in &lines {
        human.push_detail(line.clone());
    }

    emit_success(
        output,
        "watch",
        &RemountReport {
            note: note.path.clone(),
            trackers: hub.len(),
            lines,
        },
        Some(&human),
    )
}
