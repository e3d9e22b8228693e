//! Rendered progress indicators
//!
//! Indicators are never held by reference across refreshes. Every element
//! gets an identifier derived from a fixed base and the tracked note's base
//! name, and updates look the element up again through the [`Surface`]. A
//! host that throws its view away and builds a new one simply hands the
//! engine a different surface; updates against it report `NotFound` until
//! the block is rendered again.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TrackerSettings;
use crate::progress::ProgressResult;

pub const CONTAINER_BASE_ID: &str = "task-tracker-container";
pub const PROGRESS_TRACK_BASE_ID: &str = "task-tracker-progress-bar";
pub const PROGRESSION_BAR_BASE_ID: &str = "task-tracker-progression-bar";
pub const PROGRESSION_TEXT_BASE_ID: &str = "task-tracker-progression-text";
pub const LABEL_BASE_ID: &str = "task-tracker-label";
pub const ERROR_BASE_ID: &str = "task-tracker-error";

pub const CONTAINER_CLASS: &str = "task-tracker-container";
pub const PROGRESS_TRACK_CLASS: &str = "task-tracker-progress-bar";
pub const PROGRESSION_TEXT_CLASS: &str = "task-progression-text";
pub const LABEL_CLASS: &str = "task-tracker-label";
pub const ERROR_CLASS: &str = "task-tracker-error";

/// Prefix of the placeholder shown for a block that failed to build.
pub const ERROR_PREFIX: &str = "TaskTrackerError";

/// Join `base` and `name` with a hyphen after removing every space from `name`.
pub fn derive_id(base: &str, name: &str) -> String {
    let compact: String = name.split(' ').collect();
    format!("{base}-{compact}")
}

/// Inline style of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One addressable element on a rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Basename of the tracked note, kept on the container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub style: Style,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn document(mut self, document: &str) -> Self {
        self.document = Some(document.to_string());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

/// Element creation and lookup by identifier.
pub trait Surface {
    /// Add an element, replacing any element with the same id.
    fn insert(&mut self, element: Element);

    fn get(&self, id: &str) -> Option<&Element>;

    fn get_mut(&mut self, id: &str) -> Option<&mut Element>;

    fn remove(&mut self, id: &str) -> Option<Element>;
}

/// Surface backed by a map from id to element, keeping insertion order.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    elements: HashMap<String, Element>,
    order: Vec<String>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in the order they were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Direct children of `parent`, or top-level elements for `None`.
    pub fn children<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a Element> {
        self.iter()
            .filter(move |element| element.parent.as_deref() == parent)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }
}

impl Surface for ElementRegistry {
    fn insert(&mut self, element: Element) {
        if !self.elements.contains_key(&element.id) {
            self.order.push(element.id.clone());
        }
        self.elements.insert(element.id.clone(), element);
    }

    fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    fn remove(&mut self, id: &str) -> Option<Element> {
        let removed = self.elements.remove(id);
        if removed.is_some() {
            self.order.retain(|existing| existing != id);
        }
        removed
    }
}

/// The rendered indicator for one tracked note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorHandle {
    /// Id of the progression bar element
    pub id: String,
    /// Base name of the tracked note
    pub document: String,
    pub percentage: u8,
    pub color: String,
}

impl IndicatorHandle {
    pub fn container_id(&self) -> String {
        derive_id(CONTAINER_BASE_ID, &self.document)
    }

    pub fn text_id(&self) -> String {
        derive_id(PROGRESSION_TEXT_BASE_ID, &self.document)
    }
}

/// Result of updating an indicator in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(IndicatorHandle),
    /// No element with the derived id exists on the surface
    NotFound { id: String },
}

/// Create the indicator elements for `document` on `surface`.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    document: &str,
    label: Option<&str>,
    settings: &TrackerSettings,
    progress: &ProgressResult,
) -> IndicatorHandle {
    let container_id = derive_id(CONTAINER_BASE_ID, document);
    let track_id = derive_id(PROGRESS_TRACK_BASE_ID, document);
    let bar_id = derive_id(PROGRESSION_BAR_BASE_ID, document);
    let text_id = derive_id(PROGRESSION_TEXT_BASE_ID, document);

    surface.insert(
        Element::new(&container_id)
            .class(CONTAINER_CLASS)
            .document(document)
            .style(Style {
                width: Some(settings.size_key.width().to_string()),
                ..Style::default()
            }),
    );

    if let Some(label) = label {
        surface.insert(
            Element::new(derive_id(LABEL_BASE_ID, document))
                .parent(&container_id)
                .class(LABEL_CLASS)
                .text(label),
        );
    }

    surface.insert(
        Element::new(&track_id)
            .parent(&container_id)
            .class(PROGRESS_TRACK_CLASS),
    );
    surface.insert(Element::new(&bar_id).parent(&track_id).style(Style {
        width: Some(progress.label()),
        height: Some("100%".to_string()),
        background_color: Some(progress.color.clone()),
        color: None,
    }));
    surface.insert(
        Element::new(&text_id)
            .parent(&container_id)
            .class(PROGRESSION_TEXT_CLASS)
            .text(progress.label())
            .style(Style {
                color: Some(progress.color.clone()),
                ..Style::default()
            }),
    );

    info!(
        id = %bar_id,
        percentage = progress.percentage,
        color = %progress.color,
        "rendered indicator"
    );

    IndicatorHandle {
        id: bar_id,
        document: document.to_string(),
        percentage: progress.percentage,
        color: progress.color.clone(),
    }
}

/// Overwrite the indicator for `document` in place.
///
/// The bar element must exist; the text element is updated when present.
/// Nothing is recreated when the bar is missing.
pub fn update<S: Surface + ?Sized>(
    surface: &mut S,
    document: &str,
    progress: &ProgressResult,
) -> UpdateOutcome {
    let bar_id = derive_id(PROGRESSION_BAR_BASE_ID, document);
    let Some(bar) = surface.get_mut(&bar_id) else {
        warn!(id = %bar_id, "indicator not found on surface");
        return UpdateOutcome::NotFound { id: bar_id };
    };
    bar.style.width = Some(progress.label());
    bar.style.background_color = Some(progress.color.clone());

    let text_id = derive_id(PROGRESSION_TEXT_BASE_ID, document);
    match surface.get_mut(&text_id) {
        Some(text) => {
            text.text = Some(progress.label());
            text.style.color = Some(progress.color.clone());
        }
        None => debug!(id = %text_id, "progression text missing, bar updated alone"),
    }

    UpdateOutcome::Updated(IndicatorHandle {
        id: bar_id,
        document: document.to_string(),
        percentage: progress.percentage,
        color: progress.color.clone(),
    })
}

/// Show a build failure in place of an indicator. Returns the element id.
pub fn render_error<S: Surface + ?Sized>(surface: &mut S, key: &str, message: &str) -> String {
    let id = derive_id(ERROR_BASE_ID, key);
    surface.insert(
        Element::new(&id)
            .class(ERROR_CLASS)
            .text(format!("{ERROR_PREFIX}: {message}")),
    );
    id
}
