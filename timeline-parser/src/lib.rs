mod error;
mod groups;
mod parser;
mod placement;
mod popup;
mod structs;
mod timeline;
mod view;

#[cfg(feature = "ics")]
mod ics;

pub use error::RejectReason;
pub use groups::{group_order, GroupRegistry};
pub use parser::{normalize_records, parse_timeline, Records};
pub use placement::{place, Point, Size, DEFAULT_PADDING};
pub use popup::{date_range_text, format_date, Popup};
pub use structs::{
    CalendarDate, Column, Event, EventKind, Group, Record, TimelineItem, DEFAULT_GROUP, ERA_GROUP,
};
pub use timeline::{filter_items, Timeline, TimelineWindow};
pub use view::{Anchor, LoadState, PopupState, TimelineView};
