//! tasktracker - checkbox progress for markdown notes
//!
//! This library turns the checkbox tasks of a markdown note into a
//! completion percentage and a color band, renders that as an addressable
//! progress indicator, and keeps the indicator current while the note
//! changes.
//!
//! # Core Concepts
//!
//! - **Tracker blocks**: fenced `tasktracker` blocks naming a folder and a note
//! - **Task lines**: lines holding `- [ ]`, `- [x]` or `- [X]`
//! - **Bands**: four percentage ranges, each with its own color
//! - **Indicators**: surface elements found again by derived id, never by reference
//! - **Refresh cycles**: re-read, re-parse and update on every change notification
//!
//! # Module Organization
//!
//! - `config`: Block config resolution and `.tasktracker.toml` loading
//! - `task`: Checkbox task extraction
//! - `progress`: Percentage and color banding
//! - `indicator`: Rendering surface and indicator elements
//! - `store`: Document store trait, in-memory and filesystem vaults
//! - `refresh`: Tracker lifecycle and change subscriptions
//! - `block`: Fenced block extraction
//! - `watch`: Filesystem change feed
//! - `events`: JSONL event output
//! - `output`: Human and JSON command output
//! - `cli`: Command-line interface using clap

pub mod block;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod indicator;
pub mod output;
pub mod progress;
pub mod refresh;
pub mod store;
pub mod task;
pub mod watch;

pub use error::{Error, Result};
