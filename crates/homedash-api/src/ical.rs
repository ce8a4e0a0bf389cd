// iCalendar (RFC 5545 subset) parser.
//
// Parses the VEVENT blocks a calendar feed exposes: SUMMARY, DTSTART,
// DTEND, LOCATION, DESCRIPTION, UID. Anything else (alarms, recurrence
// rules, timezones beyond the trailing-Z marker) is ignored. Events
// without a DTSTART are dropped, never emitted.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// One parsed VEVENT.
#[derive(Debug, Clone, PartialEq)]
pub struct IcalEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// True when DTSTART was a bare `YYYYMMDD` date.
    pub all_day: bool,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Parse an iCalendar document into its events.
///
/// Unknown properties are skipped and malformed events are dropped
/// individually; one bad VEVENT never sinks the rest of the feed.
pub fn parse(text: &str) -> Vec<IcalEvent> {
    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;

    for line in unfold_lines(text) {
        if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
            current = Some(EventBuilder::default());
            continue;
        }
        if line.eq_ignore_ascii_case("END:VEVENT") {
            if let Some(builder) = current.take() {
                if let Some(event) = builder.finish() {
                    events.push(event);
                }
            }
            continue;
        }

        let Some(ref mut builder) = current else {
            continue;
        };
        let Some((name, value)) = split_property(&line) else {
            continue;
        };

        match name.to_ascii_uppercase().as_str() {
            "SUMMARY" => builder.summary = Some(unescape(value)),
            "DTSTART" => builder.start = parse_datetime(value),
            "DTEND" => builder.end = parse_datetime(value),
            "LOCATION" => builder.location = Some(unescape(value)),
            "DESCRIPTION" => builder.description = Some(unescape(value)),
            "UID" => builder.uid = Some(value.to_owned()),
            _ => {}
        }
    }

    events
}

#[derive(Default)]
struct EventBuilder {
    uid: Option<String>,
    summary: Option<String>,
    start: Option<(DateTime<Utc>, bool)>,
    end: Option<(DateTime<Utc>, bool)>,
    location: Option<String>,
    description: Option<String>,
}

impl EventBuilder {
    fn finish(self) -> Option<IcalEvent> {
        // DTSTART is mandatory for us: an event without it has no place
        // on a timeline.
        let (start, all_day) = self.start?;
        Some(IcalEvent {
            uid: self.uid,
            summary: self.summary,
            start,
            end: self.end.map(|(dt, _)| dt),
            all_day,
            location: self.location,
            description: self.description,
        })
    }
}

/// Join folded continuation lines (a line starting with a space or tab
/// continues the previous one), yielding logical lines.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(raw.trim_end_matches('\r').to_owned());
    }
    lines
}

/// Split `NAME;PARAM=X:VALUE` into (`NAME`, `VALUE`), stripping any
/// `;PARAM=` suffix from the property name.
fn split_property(line: &str) -> Option<(&str, &str)> {
    let (name_part, value) = line.split_once(':')?;
    let name = name_part.split(';').next().unwrap_or(name_part);
    Some((name, value))
}

/// Parse an iCal date or datetime value.
///
/// Length 8 (`YYYYMMDD`) parses as an all-day local date. Longer values
/// parse as `YYYYMMDDTHHMMSS[Z]`; a trailing `Z` forces UTC, otherwise
/// the value is interpreted in local time.
fn parse_datetime(value: &str) -> Option<(DateTime<Utc>, bool)> {
    let value = value.trim();

    if value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        let midnight = date.and_time(NaiveTime::MIN);
        return Some((local_to_utc(midnight), true));
    }

    if let Some(utc_part) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc_part, "%Y%m%dT%H%M%S").ok()?;
        return Some((Utc.from_utc_datetime(&naive), false));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    Some((local_to_utc(naive), false))
}

/// Interpret a naive timestamp in the host's local zone.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.with_timezone(&Utc)
        }
        // DST gap: fall back to treating the timestamp as UTC.
        chrono::LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Unescape iCal text: `\,` `\;` and `\n`/`\N`.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
