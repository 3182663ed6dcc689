use std::fmt::Display;

use log::{debug, warn};

use crate::{place, Point, Popup, Size, Timeline, TimelineItem, DEFAULT_PADDING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Human-readable reason, meant to be shown in place of the timeline.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Hidden,
    Shown {
        item_id: String,
        content: Popup,
        origin: Point,
        pinned: bool,
    },
}

/// Where a popup is about to be shown: the pointer plus the geometry needed to place it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub pointer: Point,
    pub popup_size: Size,
    pub viewport: Size,
}

/// Interaction state around the current snapshot: the active filter and the popup.
#[derive(Debug, Clone)]
pub struct TimelineView {
    timeline: Timeline,
    filter: String,
    popup: PopupState,
    state: LoadState,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeline: Timeline::default(),
            filter: String::new(),
            popup: PopupState::Hidden,
            state: LoadState::Loading,
        }
    }

    /// Swaps in a freshly loaded snapshot. Filter and popup start over.
    pub fn replace(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.filter.clear();
        self.popup = PopupState::Hidden;
        self.state = LoadState::Ready;
    }

    /// Records a failed load. The previous snapshot, if any, is kept.
    pub fn fail<E: Display>(&mut self, error: E) {
        warn!("Failed to load timeline data: {error}");
        self.state = LoadState::Failed(format!("Failed to load timeline data. Error: {error}"));
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn apply_filter<S: Into<String>>(&mut self, needle: S) {
        self.filter = needle.into();
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub fn displayed(&self) -> Vec<&TimelineItem> {
        self.timeline.filter(&self.filter)
    }

    #[must_use]
    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    /// Click handler: an item pins its popup, empty space hides it.
    pub fn select(&mut self, item_id: Option<&str>, anchor: Anchor) {
        match item_id {
            Some(id) => self.show(id, anchor, true),
            None => self.hide_popup(),
        }
    }

    /// Unknown IDs are logged and leave the current popup alone.
    pub fn show(&mut self, item_id: &str, anchor: Anchor, pinned: bool) {
        let Some(item) = self.timeline.item(item_id) else {
            warn!("Item not found: {item_id}");
            return;
        };

        let origin = place(anchor.pointer, anchor.popup_size, anchor.viewport, DEFAULT_PADDING);
        debug!("Popup for {item_id} at ({}, {}), pinned: {pinned}", origin.x, origin.y);

        self.popup = PopupState::Shown {
            item_id: item.id.clone(),
            content: Popup::for_item(item),
            origin,
            pinned,
        };
    }

    pub fn hide_popup(&mut self) {
        self.popup = PopupState::Hidden;
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self.popup, PopupState::Shown { pinned: true, .. })
    }
}
