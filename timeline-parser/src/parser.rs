use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use log::{debug, warn};

use crate::{CalendarDate, Column, Event, Record, RejectReason, Timeline, DEFAULT_GROUP};

const DELIMITER: char = ',';

/// Runs the whole pipeline over a published sheet and returns a fresh snapshot.
///
/// Never fails: malformed rows are logged and skipped.
pub fn parse_timeline<S: AsRef<str>>(s: S) -> Timeline {
    Timeline::from_events(normalize_records(Records::new(s.as_ref())))
}

/// Lazily splits delimited text into header-keyed records.
///
/// Rows whose field count differs from the header are dropped. Quoted fields
/// containing the delimiter are not supported.
pub struct Records<'a> {
    header: Vec<&'a str>,
    lines: Peekable<Enumerate<Lines<'a>>>,
}

impl<'a> Records<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let mut lines = text.trim().lines().enumerate().peekable();

        let header = lines
            .next()
            .map(|(_, line)| line.split(DELIMITER).map(str::trim).collect())
            .unwrap_or_default();

        if lines.peek().is_none() {
            warn!("No data rows found in input");
        }

        Self { header, lines }
    }

    #[must_use]
    pub fn header(&self) -> &[&'a str] {
        &self.header
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for (idx, line) in self.lines.by_ref() {
            let values = line.split(DELIMITER).collect::<Vec<_>>();

            if values.len() != self.header.len() {
                warn!(
                    "Skipping row {}: expected {} columns, found {}",
                    idx + 1,
                    self.header.len(),
                    values.len()
                );
                continue;
            }

            return Some(
                self.header
                    .iter()
                    .zip(values)
                    .map(|(name, value)| (*name, clean_field(value)))
                    .collect(),
            );
        }

        None
    }
}

fn clean_field(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Converts records into events, logging and skipping the ones that are rejected.
pub fn normalize_records<I: IntoIterator<Item = Record>>(records: I) -> Vec<Event> {
    let mut events = Vec::new();

    for (idx, record) in records.into_iter().enumerate() {
        let id = record.field(Column::Id).unwrap_or("<none>").to_owned();
        match Event::try_from(record) {
            Ok(event) => events.push(event),
            Err(reason) => warn!("Skipping record {} (ID {id}): {reason}", idx + 1),
        }
    }

    debug!("Normalized {} events", events.len());
    events
}

impl TryFrom<Record> for Event {
    type Error = RejectReason;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let id = required(&record, Column::Id)?.to_owned();
        let title = required(&record, Column::Title)?.to_owned();

        let year_raw = required(&record, Column::StartDateYear)?;
        let year = parse_year(year_raw)
            .ok_or_else(|| RejectReason::InvalidStartYear(year_raw.to_owned()))?;

        let start = CalendarDate::clamped(
            year,
            int_field(&record, Column::StartDateMonth).unwrap_or(1),
            int_field(&record, Column::StartDateDay).unwrap_or(1),
        );

        let end = end_date(&record);
        if end.is_none() && record.field(Column::EndDateYear).is_some() {
            debug!("Ignoring unparseable end year for event {id}");
        }

        let group = record
            .field(Column::Group)
            .unwrap_or(DEFAULT_GROUP)
            .to_owned();

        Ok(Event {
            id,
            title,
            start,
            end,
            group,
            raw: record,
        })
    }
}

fn required(record: &Record, column: Column) -> Result<&str, RejectReason> {
    record
        .field(column)
        .ok_or(RejectReason::MissingRequiredField(column))
}

/// An unparseable end year means "no end", which turns the event into a point.
fn end_date(record: &Record) -> Option<CalendarDate> {
    let year = record.field(Column::EndDateYear).and_then(parse_year)?;

    Some(CalendarDate::clamped(
        year,
        int_field(record, Column::EndDateMonth).unwrap_or(12),
        int_field(record, Column::EndDateDay).unwrap_or(31),
    ))
}

fn int_field(record: &Record, column: Column) -> Option<i64> {
    record.field(column).and_then(parse_leading_int)
}

fn parse_year(s: &str) -> Option<i32> {
    parse_leading_int(s).and_then(|year| i32::try_from(year).ok())
}

/// Reads an optional sign and the digits that follow it, ignoring any trailing
/// text (`"1800s"` is 1800). Huge values saturate instead of failing.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match *s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for digit in digits.bytes().map_while(|b| b.is_ascii_digit().then(|| i64::from(b - b'0'))) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(digit);
    }

    seen_digit.then(|| if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn records_follow_header_order() {
        let records = Records::new("ID,Title\ne1,First\ne2,Second\n").collect::<Vec<_>>();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("ID"), Some("e1"));
        assert_eq!(records[1].get("Title"), Some("Second"));
        assert_eq!(
            records[0].iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["ID", "Title"]
        );
    }

    #[test]
    fn records_drop_rows_with_wrong_shape() {
        let text = "ID,Title,Group\ne1,Too,Many,Fields\ne2,Just right,Wars\ne3,Short\n";
        let records = Records::new(text).collect::<Vec<_>>();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("ID"), Some("e2"));
    }

    #[test]
    fn records_strip_whitespace_and_wrapping_quotes() {
        let records = Records::new("ID , Title\r\n \"e1\" ,\"\"Quoted\"\"\r\n").collect::<Vec<_>>();

        assert_eq!(records[0].get("ID"), Some("e1"));
        assert_eq!(records[0].get("Title"), Some("\"Quoted\""));
    }

    #[test]
    fn empty_or_header_only_input_yields_nothing() {
        assert_eq!(Records::new("").count(), 0);
        assert_eq!(Records::new("   \n\n").count(), 0);
        assert_eq!(Records::new("ID,Title,StartDateYear\n").count(), 0);
    }

    #[test]
    fn header_is_exposed_trimmed() {
        let records = Records::new(" ID ,Title\n");
        assert_eq!(records.header(), ["ID", "Title"]);
    }

    #[test]
    fn normalizes_minimal_point_event() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "Battle of X"),
            ("StartDateYear", "1800"),
            ("Group", "Wars"),
        ]))
        .unwrap();

        assert_eq!(event.id, "e1");
        assert_eq!(event.title, "Battle of X");
        assert_eq!(event.start.to_string(), "1800-01-01");
        assert_eq!(event.end, None);
        assert_eq!(event.kind(), EventKind::Point);
        assert_eq!(event.group, "Wars");
    }

    #[test]
    fn rejects_missing_required_fields() {
        let missing_id = record(&[("ID", " "), ("Title", "T"), ("StartDateYear", "1800")]);
        let missing_title = record(&[("ID", "e1"), ("StartDateYear", "1800")]);
        let missing_year = record(&[("ID", "e1"), ("Title", "T"), ("StartDateYear", "")]);

        assert_eq!(
            Event::try_from(missing_id),
            Err(RejectReason::MissingRequiredField(Column::Id))
        );
        assert_eq!(
            Event::try_from(missing_title),
            Err(RejectReason::MissingRequiredField(Column::Title))
        );
        assert_eq!(
            Event::try_from(missing_year),
            Err(RejectReason::MissingRequiredField(Column::StartDateYear))
        );
    }

    #[test]
    fn rejects_unparseable_start_year() {
        let bad = record(&[("ID", "e1"), ("Title", "T"), ("StartDateYear", "circa")]);
        assert_eq!(
            Event::try_from(bad),
            Err(RejectReason::InvalidStartYear("circa".into()))
        );

        let overflow = record(&[("ID", "e1"), ("Title", "T"), ("StartDateYear", "99999999999")]);
        assert!(matches!(
            Event::try_from(overflow),
            Err(RejectReason::InvalidStartYear(_))
        ));
    }

    #[test]
    fn clamps_start_month_and_day() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "T"),
            ("StartDateYear", "1900"),
            ("StartDateMonth", "0"),
            ("StartDateDay", "99"),
        ]))
        .unwrap();

        assert_eq!(event.start.to_string(), "1900-01-31");
    }

    #[test]
    fn unparseable_month_falls_back_to_default() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "T"),
            ("StartDateYear", "1900"),
            ("StartDateMonth", "June"),
            ("StartDateDay", "5"),
        ]))
        .unwrap();

        assert_eq!(event.start.to_string(), "1900-01-05");
    }

    #[test]
    fn end_year_makes_a_range_with_december_defaults() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "War"),
            ("StartDateYear", "1914"),
            ("StartDateMonth", "7"),
            ("StartDateDay", "28"),
            ("EndDateYear", "1918"),
        ]))
        .unwrap();

        assert_eq!(event.kind(), EventKind::Range);
        assert_eq!(event.end.map(|d| d.to_string()).as_deref(), Some("1918-12-31"));
    }

    #[test]
    fn end_date_is_clamped_like_start_date() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "War"),
            ("StartDateYear", "1914"),
            ("EndDateYear", "1918"),
            ("EndDateMonth", "13"),
            ("EndDateDay", "0"),
        ]))
        .unwrap();

        assert_eq!(event.end.map(|d| d.to_string()).as_deref(), Some("1918-12-01"));
    }

    #[test]
    fn unparseable_end_year_degrades_to_point() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "T"),
            ("StartDateYear", "1900"),
            ("EndDateYear", "unknown"),
            ("EndDateMonth", "5"),
        ]))
        .unwrap();

        assert_eq!(event.end, None);
        assert_eq!(event.kind(), EventKind::Point);
    }

    #[test]
    fn blank_group_uses_default() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "T"),
            ("StartDateYear", "1900"),
            ("Group", "   "),
        ]))
        .unwrap();

        assert_eq!(event.group, DEFAULT_GROUP);
    }

    #[test]
    fn keeps_raw_record_including_unknown_columns() {
        let event = Event::try_from(record(&[
            ("ID", "e1"),
            ("Title", "T"),
            ("StartDateYear", "1900"),
            ("Description", "Long text"),
            ("Source", "Encyclopedia"),
        ]))
        .unwrap();

        assert_eq!(event.raw.get("Source"), Some("Encyclopedia"));
        assert_eq!(event.raw.field(Column::Description), Some("Long text"));
    }

    #[test]
    fn normalize_skips_bad_rows_and_keeps_the_rest() {
        let records = vec![
            record(&[("ID", "e1"), ("Title", "A"), ("StartDateYear", "1800")]),
            record(&[("ID", ""), ("Title", "B"), ("StartDateYear", "1801")]),
            record(&[("ID", "e3"), ("Title", "C"), ("StartDateYear", "1802")]),
        ];

        let events = normalize_records(records);
        assert_eq!(
            events.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            ["e1", "e3"]
        );
    }

    #[test]
    fn leading_int_matches_lenient_parsing() {
        assert_eq!(parse_leading_int("1800"), Some(1800));
        assert_eq!(parse_leading_int(" 1800s"), Some(1800));
        assert_eq!(parse_leading_int("-44"), Some(-44));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }
}
