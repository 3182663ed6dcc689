use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use log::{info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{group_order, Event, Group, GroupRegistry, TimelineItem};

/// Immutable result of one data load. A reload builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Timeline {
    items: Vec<TimelineItem>,
    groups: Vec<Group>,
}

impl Timeline {
    pub fn from_events(events: Vec<Event>) -> Self {
        let mut registry = GroupRegistry::new();
        for event in &events {
            registry.register(&event.group);
        }
        registry.ensure_default(&events);

        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(event.id.as_str()) {
                warn!("Duplicate event ID {}, lookups resolve to the last row", event.id);
            }
        }

        let items = events.into_iter().map(TimelineItem::from).collect::<Vec<_>>();
        let groups = registry.into_groups();

        info!("Loaded {} items and {} groups", items.len(), groups.len());

        Self { items, groups }
    }

    #[must_use]
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Groups in first-seen order. See [`Timeline::ordered_groups`] for display.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn ordered_groups(&self) -> Vec<&Group> {
        let mut groups = self.groups.iter().collect::<Vec<_>>();
        groups.sort_by(|a, b| group_order(a, b));
        groups
    }

    /// Later rows with the same ID shadow earlier ones.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&TimelineItem> {
        self.items.iter().rev().find(|item| item.id == id)
    }

    #[must_use]
    pub fn filter(&self, needle: &str) -> Vec<&TimelineItem> {
        filter_items(&self.items, needle)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Case-insensitive substring match on item labels. An empty needle keeps everything.
#[must_use]
pub fn filter_items<'a>(items: &'a [TimelineItem], needle: &str) -> Vec<&'a TimelineItem> {
    let needle = needle.to_lowercase();
    items
        .iter()
        .filter(|item| item.label.to_lowercase().contains(&needle))
        .collect()
}

/// Initial visible range and pan limits handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimelineWindow {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineWindow {
    const EARLIEST_YEAR: i32 = 1700;
    const YEARS_AHEAD: i32 = 5;

    /// From 1700 up to January 1st five years after `today`.
    #[must_use]
    pub fn default_for(today: NaiveDate) -> Self {
        let min = NaiveDate::from_ymd_opt(Self::EARLIEST_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
        let max = NaiveDate::from_ymd_opt(today.year() + Self::YEARS_AHEAD, 1, 1)
            .unwrap_or(NaiveDate::MAX);

        Self {
            min,
            max,
            start: min,
            end: max,
        }
    }
}
