//! Change-driven refresh of rendered trackers
//!
//! A [`Tracker`] is built once per block: it resolves settings, finds the
//! note, parses it and renders the indicator. Only a tracker that reached
//! `Rendered` can be subscribed to a [`ChangeHub`]. The hub offers every
//! change notification to every subscription; each tracker ignores
//! documents other than its own and otherwise re-reads, re-parses and
//! updates its indicator in place. Failed cycles are logged and leave the
//! subscription untouched, so the next change simply tries again.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{resolve, TrackerConfig, TrackerSettings};
use crate::error::{Error, Result};
use crate::indicator::{self, IndicatorHandle, Surface, UpdateOutcome};
use crate::progress::ProgressResult;
use crate::store::{find_document, normalize_path, DocumentRef, DocumentStore};
use crate::task;

/// Lifecycle of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    Uninitialized,
    Rendered,
    Refreshing,
    Failed,
}

/// What one change notification did to a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The change was for another document
    Ignored,
    Updated { progress: ProgressResult },
    /// The indicator was not on the surface; nothing was recreated
    Stale { id: String },
    Failed { message: String },
}

/// One tracked note and the indicator that shows it.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackerConfig,
    settings: TrackerSettings,
    folder: String,
    document: Option<DocumentRef>,
    state: TrackerState,
    refreshes: u64,
}

impl Tracker {
    /// Validate `config` and resolve its settings. Nothing is read yet.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let settings = resolve(&config);
        let folder = normalize_path(&config.path);
        Ok(Self {
            config,
            settings,
            folder,
            document: None,
            state: TrackerState::Uninitialized,
            refreshes: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// The note this tracker follows, once built.
    pub fn document(&self) -> Option<&DocumentRef> {
        self.document.as_ref()
    }

    /// Refresh cycles that reached the document, successful or not.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Find and read the note, then render the initial indicator.
    pub fn build<D, S>(&mut self, store: &D, surface: &mut S) -> Result<IndicatorHandle>
    where
        D: DocumentStore + ?Sized,
        S: Surface + ?Sized,
    {
        let folder = store
            .folder(&self.folder)
            .ok_or_else(|| Error::FolderNotFound(self.folder.clone()))?;
        let document = find_document(&folder, &self.config.file_name).ok_or_else(|| {
            Error::DocumentNotFound {
                folder: self.folder.clone(),
                file_name: self.config.file_name.clone(),
            }
        })?;

        let text = store.read(&document)?;
        let progress = self.compute(&text);
        let handle = indicator::render(
            surface,
            document.basename(),
            self.config.display_label(),
            &self.settings,
            &progress,
        );

        debug!(document = %document, "tracker built");
        self.document = Some(document);
        self.transition(TrackerState::Rendered);
        Ok(handle)
    }

    /// True when `changed` is the note this tracker follows.
    pub fn matches(&self, changed: &DocumentRef) -> bool {
        changed.is_note()
            && changed.folder() == self.folder
            && changed.basename() == self.config.file_name
    }

    /// Handle one change notification.
    pub fn refresh<D, S>(&mut self, store: &D, surface: &mut S, changed: &DocumentRef) -> RefreshOutcome
    where
        D: DocumentStore + ?Sized,
        S: Surface + ?Sized,
    {
        if self.state == TrackerState::Uninitialized || !self.matches(changed) {
            return RefreshOutcome::Ignored;
        }

        self.transition(TrackerState::Refreshing);
        self.refreshes += 1;

        let text = match store.read(changed) {
            Ok(text) => text,
            Err(err) => {
                self.transition(TrackerState::Failed);
                error!(document = %changed, error = %err, "refresh failed");
                self.transition(TrackerState::Rendered);
                return RefreshOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };

        let progress = self.compute(&text);
        let outcome = match indicator::update(surface, changed.basename(), &progress) {
            UpdateOutcome::Updated(_) => {
                info!(
                    document = %changed,
                    percentage = progress.percentage,
                    "tracker updated"
                );
                RefreshOutcome::Updated { progress }
            }
            UpdateOutcome::NotFound { id } => {
                warn!(document = %changed, id = %id, "indicator gone, waiting for next render");
                RefreshOutcome::Stale { id }
            }
        };

        self.transition(TrackerState::Rendered);
        outcome
    }

    fn compute(&self, text: &str) -> ProgressResult {
        let counts = task::parse(text);
        let progress = ProgressResult::compute(&counts, &self.settings.colors);
        debug!(
            incomplete = counts.incomplete,
            completed = counts.completed,
            percentage = progress.percentage,
            color = %progress.color,
            "computed progress"
        );
        progress
    }

    fn transition(&mut self, next: TrackerState) {
        debug!(from = ?self.state, to = ?next, "tracker state");
        self.state = next;
    }
}

/// Identifier of a subscription in a [`ChangeHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Subscriptions to the store-wide change feed.
#[derive(Debug, Default)]
pub struct ChangeHub {
    next_id: u64,
    trackers: BTreeMap<SubscriptionId, Tracker>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built tracker. Trackers that never rendered are refused.
    pub fn subscribe(&mut self, tracker: Tracker) -> Result<SubscriptionId> {
        if tracker.state() == TrackerState::Uninitialized {
            return Err(Error::InvalidArgument(
                "tracker must be built before it can subscribe".to_string(),
            ));
        }
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        info!(subscription = %id, file_name = %tracker.config.file_name, "subscribed to changes");
        self.trackers.insert(id, tracker);
        Ok(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Tracker> {
        let removed = self.trackers.remove(&id);
        if removed.is_some() {
            debug!(subscription = %id, "unsubscribed");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.trackers.clear();
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn get(&self, id: SubscriptionId) -> Option<&Tracker> {
        self.trackers.get(&id)
    }

    /// Offer a change to every subscription. Returns the outcomes of the
    /// trackers that follow `changed`.
    pub fn notify<D, S>(
        &mut self,
        changed: &DocumentRef,
        store: &D,
        surface: &mut S,
    ) -> Vec<(SubscriptionId, RefreshOutcome)>
    where
        D: DocumentStore + ?Sized,
        S: Surface + ?Sized,
    {
        let mut outcomes = Vec::new();
        for (id, tracker) in self.trackers.iter_mut() {
            match tracker.refresh(store, surface, changed) {
                RefreshOutcome::Ignored => {}
                outcome => outcomes.push((*id, outcome)),
            }
        }
        if outcomes.is_empty() {
            debug!(document = %changed, "change ignored by all trackers");
        }
        outcomes
    }
}

/// A block that was built and subscribed.
#[derive(Debug, Clone)]
pub struct Mounted {
    pub subscription: SubscriptionId,
    pub handle: IndicatorHandle,
}

/// Build the block in `source` and subscribe it to `hub`.
///
/// On failure an error placeholder keyed by `key` is written to `surface`,
/// the error is returned and nothing is subscribed.
pub fn mount_block<D, S>(
    key: &str,
    source: &str,
    store: &D,
    surface: &mut S,
    hub: &mut ChangeHub,
) -> Result<Mounted>
where
    D: DocumentStore + ?Sized,
    S: Surface + ?Sized,
{
    let built = TrackerConfig::from_block(source)
        .and_then(Tracker::new)
        .and_then(|mut tracker| {
            let handle = tracker.build(store, surface)?;
            Ok((tracker, handle))
        });

    match built {
        Ok((tracker, handle)) => {
            let subscription = hub.subscribe(tracker)?;
            Ok(Mounted {
                subscription,
                handle,
            })
        }
        Err(err) => {
            error!(block = key, error = %err, "tracker block failed to build");
            indicator::render_error(surface, key, &err.to_string());
            Err(err)
        }
    }
}
