//! Merged calendar → iCalendar text.

use camerge_engine::{EventStatus, MergedCalendar};
use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike};

const CRLF: &str = "\r\n";

/// Encode `calendar` as an iCalendar document.
///
/// Times are written in UTC. `stamp` becomes every event's DTSTAMP; pass a
/// fixed value to get byte-identical output for identical input.
pub fn encode(calendar: &MergedCalendar, stamp: DateTime<Utc>) -> String {
    let mut out = Calendar::new();
    out.name(&calendar.name);
    out.timezone(calendar.timezone.name());

    for event in &calendar.events {
        out.push(
            Event::new()
                .uid(&event.uid)
                .timestamp(stamp)
                .starts(event.start)
                .ends(event.end)
                .summary(&event.summary)
                .status(ical_status(event.status))
                .done(),
        );
    }

    with_product_id(&out.to_string(), &calendar.product_id)
}

/// Replace whatever PRODID the builder wrote with ours, right after
/// `BEGIN:VCALENDAR`.
fn with_product_id(text: &str, product_id: &str) -> String {
    let mut lines = text
        .split(CRLF)
        .filter(|line| !line.to_ascii_uppercase().starts_with("PRODID:"));
    let mut out = String::with_capacity(text.len() + product_id.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
        out.push_str(CRLF);
        out.push_str("PRODID:");
        out.push_str(product_id);
    }
    for line in lines {
        out.push_str(CRLF);
        out.push_str(line);
    }
    out
}

fn ical_status(status: EventStatus) -> icalendar::EventStatus {
    match status {
        EventStatus::Confirmed => icalendar::EventStatus::Confirmed,
        EventStatus::Tentative => icalendar::EventStatus::Tentative,
        EventStatus::Cancelled => icalendar::EventStatus::Cancelled,
    }
}
