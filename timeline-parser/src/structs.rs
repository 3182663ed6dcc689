use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize, Serializer};

/// Group assigned to events whose `Group` column is blank or missing.
pub const DEFAULT_GROUP: &str = "General Events";

/// Group label that always stacks below every other group.
pub const ERA_GROUP: &str = "ERA";

/// Columns the normalizer knows about. Anything else only lives in [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Title,
    StartDateYear,
    StartDateMonth,
    StartDateDay,
    EndDateYear,
    EndDateMonth,
    EndDateDay,
    Group,
    Description,
}

impl Column {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::StartDateYear => "StartDateYear",
            Self::StartDateMonth => "StartDateMonth",
            Self::StartDateDay => "StartDateDay",
            Self::EndDateYear => "EndDateYear",
            Self::EndDateMonth => "EndDateMonth",
            Self::EndDateDay => "EndDateDay",
            Self::Group => "Group",
            Self::Description => "Description",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spreadsheet row, keyed by header name in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Record(IndexMap<String, String>);

impl Record {
    /// Raw value of an arbitrary column, exactly as parsed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Trimmed value of a recognized column, `None` when missing or blank.
    #[must_use]
    pub fn field(&self, column: Column) -> Option<&str> {
        self.get(column.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A calendar date as entered in the sheet.
///
/// Month and day are clamped into `1..=12` and `1..=31` independently, so
/// values such as February 30th are representable on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    #[must_use]
    pub fn clamped(year: i32, month: i64, day: i64) -> Self {
        // Both bounds fit in u32, so the casts cannot truncate.
        Self {
            year,
            month: month.clamp(1, 12) as u32,
            day: day.clamp(1, 31) as u32,
        }
    }

    /// Closest real date, pulling overflowing days back to the end of the month.
    ///
    /// Returns `None` only for years chrono cannot represent.
    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        (28..=self.day.max(28))
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(self.year, self.month, day.min(self.day)))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(feature = "serde")]
impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum EventKind {
    Point,
    Range,
}

/// A validated row. Only built through `Event::try_from(Record)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: CalendarDate,
    pub end: Option<CalendarDate>,
    pub group: String,
    pub raw: Record,
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self.end {
            Some(_) => EventKind::Range,
            None => EventKind::Point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Group {
    pub id: String,
    pub label: String,
}

impl Group {
    #[must_use]
    pub fn new<S: Into<String>>(label: S) -> Self {
        let label = label.into();
        Self {
            id: label.clone(),
            label,
        }
    }
}

/// What the renderer draws for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimelineItem {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub start: CalendarDate,
    pub end: Option<CalendarDate>,
    pub group: String,
    pub kind: EventKind,
    pub raw: Record,
}

impl From<Event> for TimelineItem {
    fn from(event: Event) -> Self {
        let kind = event.kind();
        Self {
            id: event.id,
            tooltip: event.title.clone(),
            label: event.title,
            start: event.start,
            end: event.end,
            group: event.group,
            kind,
            raw: event.raw,
        }
    }
}
