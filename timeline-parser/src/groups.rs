use std::cmp::Ordering;

use indexmap::IndexSet;
use log::debug;

use crate::{Event, Group, DEFAULT_GROUP, ERA_GROUP};

/// Distinct group labels, in order of first registration.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    labels: IndexSet<String>,
}

impl GroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the label was already known.
    pub fn register(&mut self, label: &str) -> bool {
        if self.labels.contains(label) {
            return false;
        }

        debug!("Created new group: {label}");
        self.labels.insert(label.to_owned())
    }

    /// Registers the default group if any event falls back to it.
    pub fn ensure_default<'a, I>(&mut self, events: I) -> bool
    where
        I: IntoIterator<Item = &'a Event>,
    {
        if self.contains(DEFAULT_GROUP) {
            return false;
        }

        events
            .into_iter()
            .any(|event| event.group == DEFAULT_GROUP)
            && self.register(DEFAULT_GROUP)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_groups(self) -> Vec<Group> {
        self.labels.into_iter().map(Group::new).collect()
    }
}

/// Display stacking order: `ERA` last, everything else by label.
#[must_use]
pub fn group_order(a: &Group, b: &Group) -> Ordering {
    match (a.label == ERA_GROUP, b.label == ERA_GROUP) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.label.cmp(&b.label),
    }
}
