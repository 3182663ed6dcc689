use chrono::Datelike;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{CalendarDate, Column, TimelineItem};

/// Text shown in the detail popup for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Popup {
    pub title: String,
    pub date_range_text: String,
    pub detail_text: String,
}

impl Popup {
    #[must_use]
    pub fn for_item(item: &TimelineItem) -> Self {
        let title = item.raw.field(Column::Title).unwrap_or("No Title").to_owned();
        let detail_text = item
            .raw
            .field(Column::Description)
            .unwrap_or_default()
            .to_owned();

        Self {
            title,
            date_range_text: date_range_text(&item.start, item.end.as_ref()),
            detail_text,
        }
    }
}

#[must_use]
pub fn date_range_text(start: &CalendarDate, end: Option<&CalendarDate>) -> String {
    match end.filter(|end| *end != start) {
        Some(end) => format!("{} to {}", format_date(start), format_date(end)),
        None => format_date(start),
    }
}

/// January 1st stands for "only the year is known" and shows as the bare year.
#[must_use]
pub fn format_date(date: &CalendarDate) -> String {
    if date.month == 1 && date.day == 1 {
        return date.year.to_string();
    }

    match date.to_naive_date() {
        Some(naive) => format!("{} {}, {}", naive.format("%b"), naive.day(), naive.year()),
        None => date.to_string(),
    }
}
