use chrono::Datelike;
use ics::{
    escape_text,
    parameters::Value,
    properties::{Categories, Description, DtEnd, DtStart, Summary},
};

use crate::{Column, Timeline, TimelineItem};

impl Timeline {
    /// All-day calendar export. Items outside the years iCalendar can express are left out.
    #[must_use]
    pub fn to_ics<'a>(&'a self, name: &'a str) -> ics::ICalendar<'a> {
        let mut icalendar = ics::ICalendar::new("2.0", name);

        for event in self.items().iter().filter_map(TimelineItem::to_ics) {
            icalendar.add_event(event);
        }

        icalendar
    }
}

impl TimelineItem {
    #[must_use]
    pub fn to_ics(&self) -> Option<ics::Event<'_>> {
        let start = self.start.to_naive_date()?;
        let last_day = self
            .end
            .map_or(Some(start), |end| end.to_naive_date())?
            .max(start);
        // DTEND is exclusive for all-day events.
        let end = last_day.succ_opt()?;

        if start.year() < 0 || end.year() > 9999 {
            return None;
        }

        let start = start.format("%Y%m%d").to_string();
        let end = end.format("%Y%m%d").to_string();

        let mut ics_event = ics::Event::new(self.id.as_str(), format!("{start}T000000Z"));

        let mut dtstart = DtStart::new(start);
        dtstart.add(Value::new("DATE"));
        ics_event.push(dtstart);

        let mut dtend = DtEnd::new(end);
        dtend.add(Value::new("DATE"));
        ics_event.push(dtend);

        ics_event.push(Summary::new(escape_text(self.label.as_str())));
        ics_event.push(Categories::new(escape_text(self.group.as_str())));

        if let Some(description) = self.raw.field(Column::Description) {
            ics_event.push(Description::new(escape_text(description)));
        }

        Some(ics_event)
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_timeline;

    const SHEET: &str = "\
ID,Title,StartDateYear,EndDateYear,Group,Description
e1,Treaty,1648,,Politics,Peace at last
e2,War,1337,1453,Wars,
e3,Founding,-753,,,";

    #[test]
    fn exports_all_day_events() {
        let timeline = parse_timeline(SHEET);
        let ics = timeline.to_ics("History").to_string();

        assert!(ics.contains("UID:e1"));
        assert!(ics.contains("DTSTART;VALUE=DATE:16480101"));
        assert!(ics.contains("DTEND;VALUE=DATE:16480102"));
        assert!(ics.contains("SUMMARY:Treaty"));
        assert!(ics.contains("CATEGORIES:Politics"));
        assert!(ics.contains("DESCRIPTION:Peace at last"));
    }

    #[test]
    fn range_end_is_exclusive() {
        let timeline = parse_timeline(SHEET);
        let ics = timeline.to_ics("History").to_string();

        assert!(ics.contains("DTSTART;VALUE=DATE:13370101"));
        assert!(ics.contains("DTEND;VALUE=DATE:14540101"));
    }

    #[test]
    fn skips_dates_before_year_zero() {
        let timeline = parse_timeline(SHEET);

        assert!(timeline.item("e3").and_then(|item| item.to_ics()).is_none());
        assert_eq!(timeline.to_ics("History").to_string().matches("BEGIN:VEVENT").count(), 2);
    }
}
