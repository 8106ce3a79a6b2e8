//! Tests for decoding calendar documents into raw events.

use camerge_engine::{EventStatus, EventTime, ParticipationStatus, RawEvent};
use camerge_ical::{parse_calendar, IcalError, ParseOptions};
use chrono::NaiveDate;

const SMALL: &str = include_str!("fixtures/small-calendar.ics");

fn parse(text: &str) -> Vec<RawEvent> {
    parse_calendar(text, &ParseOptions::default()).unwrap()
}

fn by_uid<'a>(events: &'a [RawEvent], uid: &str) -> &'a RawEvent {
    events
        .iter()
        .find(|e| e.uid.as_deref() == Some(uid))
        .unwrap_or_else(|| panic!("no event with uid {}", uid))
}

// ── Documents ───────────────────────────────────────────────────────────────

#[test]
fn every_vevent_becomes_a_raw_event() {
    let events = parse(SMALL);
    assert_eq!(events.len(), 3);
}

#[test]
fn timezone_components_are_not_events() {
    let events = parse(SMALL);
    assert!(events.iter().all(|e| e.uid.is_some()));
}

#[test]
fn html_page_is_rejected() {
    let err = parse_calendar(
        include_str!("fixtures/not-a-calendar.html"),
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IcalError::Malformed(_)));
}

#[test]
fn empty_text_is_rejected() {
    let err = parse_calendar("", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, IcalError::Malformed(_)));
}

#[test]
fn byte_order_mark_is_tolerated() {
    let text = format!("\u{feff}{}", SMALL);
    assert_eq!(parse(&text).len(), 3);
}

#[test]
fn calendar_without_events_is_empty() {
    let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//x//y//EN\r\nEND:VCALENDAR\r\n";
    assert!(parse(text).is_empty());
}

// ── Properties ──────────────────────────────────────────────────────────────

#[test]
fn zoned_times_keep_their_tzid() {
    let events = parse(SMALL);
    let planning = by_uid(&events, "planning-2024@corp.example.com");

    let expected = NaiveDate::from_ymd_opt(2024, 1, 10)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    assert_eq!(
        planning.start,
        Some(EventTime::Zoned {
            local: expected,
            tzid: "Europe/Prague".to_string(),
        })
    );
}

#[test]
fn escaped_text_is_decoded() {
    let events = parse(SMALL);
    let planning = by_uid(&events, "planning-2024@corp.example.com");

    assert_eq!(planning.summary.as_deref(), Some("Quarterly planning, budget"));
    assert_eq!(planning.description.as_deref(), Some("Agenda:\nbudget"));
}

#[test]
fn folded_lines_are_joined() {
    let events = parse(SMALL);
    let vacation = by_uid(&events, "vacation@personal.example.com");

    assert_eq!(
        vacation.summary.as_deref(),
        Some("Vacation in the mountains with a very long summary that needs folding across lines")
    );
}

#[test]
fn all_day_event_has_date_values() {
    let events = parse(SMALL);
    let vacation = by_uid(&events, "vacation@personal.example.com");

    assert_eq!(vacation.start, Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())));
    assert_eq!(vacation.end, Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap())));
}

#[test]
fn participants_and_statuses_are_read() {
    let events = parse(SMALL);
    let planning = by_uid(&events, "planning-2024@corp.example.com");

    assert_eq!(planning.organizer.as_deref(), Some("mailto:boss@example.com"));
    assert_eq!(planning.status, Some(EventStatus::Confirmed));

    let attendees: Vec<(&str, Option<&ParticipationStatus>)> = planning
        .attendees
        .iter()
        .map(|a| (a.email.as_str(), a.partstat.as_ref()))
        .collect();
    assert_eq!(
        attendees,
        vec![
            ("mailto:confirmed@example.com", Some(&ParticipationStatus::Accepted)),
            ("mailto:maybe@example.com", Some(&ParticipationStatus::Tentative)),
            // The EMAIL parameter wins over an opaque value.
            ("declined@example.com", Some(&ParticipationStatus::Declined)),
        ]
    );
}

#[test]
fn event_without_start_is_kept_for_the_engine_to_drop() {
    let events = parse(SMALL);
    let broken = by_uid(&events, "no-start@corp.example.com");
    assert!(broken.start.is_none());
}

#[test]
fn unreadable_dtstart_loses_only_that_property() {
    let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nDTSTART:tomorrow\r\n\
                SUMMARY:Lunch\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    let events = parse(text);

    assert_eq!(events.len(), 1);
    assert!(events[0].start.is_none());
    assert_eq!(events[0].summary.as_deref(), Some("Lunch"));
}

#[test]
fn duration_is_read_when_dtend_is_missing() {
    let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nDTSTART:20240110T090000Z\r\n\
                DURATION:PT1H30M\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    let events = parse(text);

    assert_eq!(events[0].end, None);
    assert_eq!(events[0].duration, Some(chrono::Duration::minutes(90)));
}

#[test]
fn oversized_duration_loses_only_that_property() {
    let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nDTSTART:20240110T090000Z\r\n\
                DURATION:P99999999999999W\r\nSUMMARY:Forever\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    let events = parse(text);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].duration, None);
    assert_eq!(events[0].summary.as_deref(), Some("Forever"));
}

#[test]
fn occurrences_ending_past_the_calendar_range_are_dropped() {
    let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nDTSTART:20240110T090000Z\r\n\
                DURATION:P99999999D\r\nRRULE:FREQ=DAILY;COUNT=3\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    assert!(parse(text).is_empty());
}
