//! Command-line interface for tasktracker
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventDestination, EventKind, EventSink};
use crate::store::{DocumentRef, FsVault};

mod count;
mod show;
mod watch;

/// tasktracker - checkbox progress for markdown notes
///
/// Renders progress indicators for the `tasktracker` blocks of a note and
/// keeps them current while the tracked notes change.
#[derive(Parser, Debug)]
#[command(name = "tasktracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault root (defaults to current directory)
    #[arg(long, global = true, env = "TASKTRACKER_VAULT")]
    pub vault: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write JSONL events to a file, or `-` for stdout
    #[arg(long, global = true)]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count the checkbox tasks of one note
    Count {
        /// Markdown file to parse
        file: PathBuf,

        /// Include every task line
        #[arg(long)]
        lines: bool,
    },

    /// Render the tracker blocks of a note once
    Show {
        /// Note containing `tasktracker` blocks, relative to the vault
        note: String,
    },

    /// Render the tracker blocks of a note and follow changes
    Watch {
        /// Note containing `tasktracker` blocks, relative to the vault
        note: String,

        /// Stop after this many change notifications
        #[arg(long)]
        max_events: Option<usize>,
    },
}

/// Vault, host config and event sink shared by the vault commands.
pub(crate) struct HostContext {
    pub vault: FsVault,
    pub config: HostConfig,
    pub events: Option<EventSink>,
}

impl HostContext {
    fn open(vault: Option<PathBuf>, events: Option<&str>) -> Result<Self> {
        let root = vault
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let vault = FsVault::open(&root)?;
        let config = HostConfig::load_from_vault(vault.root());
        let events = match EventDestination::parse(events) {
            Some(destination) => Some(destination.open()?),
            None => None,
        };
        Ok(Self {
            vault,
            config,
            events,
        })
    }

    /// Resolve a note argument, accepting vault-relative or absolute paths.
    pub fn note(&self, raw: &str) -> Result<DocumentRef> {
        let path = Path::new(raw);
        let document = if path.is_absolute() {
            let absolute = path.canonicalize()?;
            self.vault.document_for(&absolute)?
        } else {
            DocumentRef::new(raw)
        };
        if !document.is_note() {
            return Err(Error::InvalidArgument(format!(
                "{raw} is not a markdown note"
            )));
        }
        Ok(document)
    }

    /// Emit an event when a sink is configured. Sink failures are logged only.
    pub fn emit<T: Serialize>(&mut self, kind: EventKind, document: Option<&str>, data: T) {
        let Some(sink) = self.events.as_mut() else {
            return;
        };
        let result = Event::new(kind, document.map(str::to_string))
            .with_data(data)
            .and_then(|event| sink.emit(&event));
        if let Err(err) = result {
            warn!(error = %err, "failed to emit event");
        }
    }
}

impl Cli {
    /// JSON envelopes are off while events stream to stdout, so stdout stays
    /// line-delimited JSON.
    pub fn json_output(&self) -> bool {
        let events_to_stdout = matches!(
            EventDestination::parse(self.events.as_deref()),
            Some(EventDestination::Stdout)
        );
        self.json && !events_to_stdout
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let json = self.json_output();
        match self.command {
            Commands::Count { file, lines } => count::run(count::CountOptions {
                file,
                lines,
                json,
                quiet: self.quiet,
            }),
            Commands::Show { note } => {
                let host = HostContext::open(self.vault, self.events.as_deref())?;
                show::run(
                    host,
                    show::ShowOptions {
                        note,
                        json,
                        quiet: self.quiet,
                    },
                )
            }
            Commands::Watch { note, max_events } => {
                let host = HostContext::open(self.vault, self.events.as_deref())?;
                watch::run(
                    host,
                    watch::WatchOptions {
                        note,
                        max_events,
                        json,
                        quiet: self.quiet,
                    },
                )
            }
        }
    }
}
