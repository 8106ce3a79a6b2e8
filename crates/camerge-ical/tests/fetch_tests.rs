//! Tests for source locations and loading. HTTP is exercised only through
//! its failure path; files and inline data cover the success paths.

use std::path::PathBuf;
use std::time::Duration;

use camerge_engine::SourceError;
use camerge_ical::fetch::{redact, DEFAULT_TIMEOUT};
use camerge_ical::{Fetcher, IcalError, Location, ParseOptions, SourceSpec};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_location(name: &str) -> String {
    format!("file://{}/{}", FIXTURES, name)
}

fn fetcher() -> Fetcher {
    Fetcher::new(DEFAULT_TIMEOUT).unwrap()
}

const INLINE: &str = "data://BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:inline\r\n\
                      DTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\nSUMMARY:Inline\r\n\
                      END:VEVENT\r\nEND:VCALENDAR\r\n";

// ── Locations ───────────────────────────────────────────────────────────────

#[test]
fn http_locations_are_kept() {
    assert_eq!(
        Location::parse("https://calendar.example.com/private/abc.ics").unwrap(),
        Location::Http("https://calendar.example.com/private/abc.ics".to_string())
    );
    assert_eq!(
        Location::parse("http://localhost:8080/cal.ics").unwrap(),
        Location::Http("http://localhost:8080/cal.ics".to_string())
    );
}

#[test]
fn webcal_is_fetched_over_https() {
    assert_eq!(
        Location::parse("webcal://p01-caldav.example.com/published/2/xyz").unwrap(),
        Location::Http("https://p01-caldav.example.com/published/2/xyz".to_string())
    );
}

#[test]
fn file_and_data_locations() {
    assert_eq!(
        Location::parse("file:///tmp/work.ics").unwrap(),
        Location::File(PathBuf::from("/tmp/work.ics"))
    );
    assert_eq!(Location::parse("data://BEGIN:VCALENDAR").unwrap(), Location::Data("BEGIN:VCALENDAR"));
}

#[test]
fn scheme_is_case_insensitive() {
    assert!(matches!(Location::parse("HTTPS://example.com/a.ics"), Ok(Location::Http(_))));
}

#[test]
fn unknown_schemes_are_rejected() {
    for location in ["ftp://example.com/a.ics", "/tmp/work.ics", ""] {
        assert!(
            matches!(Location::parse(location), Err(IcalError::UnsupportedLocation(_))),
            "{:?} should be rejected",
            location
        );
    }
}

#[test]
fn redaction_hides_paths_and_inline_data() {
    assert_eq!(
        redact("https://calendar.example.com/private-token-123/basic.ics"),
        "https://calendar.example.com/…"
    );
    assert_eq!(redact("data://BEGIN:VCALENDAR..."), "data://…");
    assert!(!redact("file:///home/me/secret.ics").contains("secret"));
}

// ── Loading ─────────────────────────────────────────────────────────────────

#[test]
fn inline_data_is_parsed() {
    let source = fetcher()
        .load(&SourceSpec::new(INLINE, true), &ParseOptions::default())
        .unwrap();

    assert!(source.anonymize);
    assert_eq!(source.events.len(), 1);
    assert_eq!(source.events[0].summary.as_deref(), Some("Inline"));
}

#[test]
fn file_is_read_and_parsed() {
    let location = fixture_location("small-calendar.ics");
    let source = fetcher()
        .load(&SourceSpec::new(location.clone(), false), &ParseOptions::default())
        .unwrap();

    assert_eq!(source.id, location);
    assert!(!source.anonymize);
    assert_eq!(source.events.len(), 3);
}

#[test]
fn missing_file_is_a_fetch_error() {
    let location = fixture_location("does-not-exist.ics");
    let err = fetcher()
        .load(&SourceSpec::new(location.clone(), false), &ParseOptions::default())
        .unwrap_err();

    assert!(matches!(err, SourceError::Fetch { .. }));
    assert_eq!(err.source_id(), redact(&location));
    assert!(!err.to_string().contains("does-not-exist"));
}

#[test]
fn non_calendar_body_is_a_parse_error() {
    let location = fixture_location("not-a-calendar.html");
    let err = fetcher()
        .load(&SourceSpec::new(location, false), &ParseOptions::default())
        .unwrap_err();

    assert!(matches!(err, SourceError::Parse { .. }));
}

#[test]
fn unreachable_host_is_a_fetch_error() {
    let fetcher = Fetcher::new(Duration::from_secs(2)).unwrap();
    // Port 9 on the loopback interface refuses connections.
    let err = fetcher
        .load(&SourceSpec::new("http://127.0.0.1:9/cal.ics", false), &ParseOptions::default())
        .unwrap_err();

    assert!(matches!(err, SourceError::Fetch { .. }));
}

#[test]
fn load_all_keeps_order_and_isolates_failures() {
    let specs = vec![
        SourceSpec::new(fixture_location("declined-event.ics"), false),
        SourceSpec::new("gopher://example.com/cal", false),
        SourceSpec::new(INLINE, true),
    ];
    let results = fetcher().load_all(&specs, &ParseOptions::default());

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().id, specs[0].location);
    assert!(matches!(results[1], Err(SourceError::Fetch { .. })));
    assert_eq!(results[2].as_ref().unwrap().events[0].uid.as_deref(), Some("inline"));
}

#[test]
fn load_all_with_no_sources_is_empty() {
    assert!(fetcher().load_all(&[], &ParseOptions::default()).is_empty());
}
