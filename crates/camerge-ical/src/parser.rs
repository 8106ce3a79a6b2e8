//! iCalendar text → raw event records.
//!
//! Content lines are read with the `icalendar` crate's parser; the VEVENT
//! properties the engine needs are decoded here and recurring series are
//! expanded by [`crate::expander`]. A single unreadable property makes the
//! event lose that property, never the whole calendar.

use camerge_engine::{Attendee, EventStatus, EventTime, ParticipationStatus, RawEvent};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use icalendar::parser::{read_calendar, unfold, Component};

use crate::error::{IcalError, Result};
use crate::expander;
use crate::values::{parse_duration, parse_time, parse_time_list, unescape_text};

/// Default cap on occurrences generated per recurring series.
pub const DEFAULT_MAX_INSTANCES: u16 = 500;

/// Parser configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Timezone for floating and all-day values and for unknown TZIDs.
    pub timezone: Tz,
    /// Skip occurrences that end before this instant.
    pub expand_from: Option<DateTime<Utc>>,
    /// Skip occurrences that start after this instant.
    pub expand_until: Option<DateTime<Utc>>,
    /// Maximum occurrences generated per series.
    pub max_instances: u16,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            expand_from: None,
            expand_until: None,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl ParseOptions {
    pub(crate) fn admits(&self, start: DateTime<Utc>, length: Duration) -> bool {
        self.expand_from
            .is_none_or(|from| start.checked_add_signed(length).is_none_or(|end| end >= from))
            && self.expand_until.is_none_or(|until| start <= until)
    }
}

/// A decoded VEVENT before recurrence expansion.
#[derive(Debug, Clone, Default)]
pub(crate) struct VEvent {
    pub raw: RawEvent,
    pub rrule: Option<String>,
    pub rdates: Vec<EventTime>,
    pub exdates: Vec<EventTime>,
}

/// One property with its name and parameter keys uppercased.
#[derive(Debug, Clone)]
struct ContentLine {
    name: String,
    value: String,
    params: Vec<(String, String)>,
}

impl ContentLine {
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn time(&self) -> Option<EventTime> {
        parse_time(&self.name, &self.value, self.param("VALUE"), self.param("TZID"))
            .map_err(|err| tracing::debug!(error = %err, "ignoring unreadable time"))
            .ok()
    }

    fn time_list(&self) -> Vec<EventTime> {
        parse_time_list(&self.name, &self.value, self.param("VALUE"), self.param("TZID"))
            .map_err(|err| tracing::debug!(error = %err, "ignoring unreadable time list"))
            .unwrap_or_default()
    }
}

/// Parse a calendar document into event occurrences.
///
/// # Errors
/// Returns `IcalError::Malformed` if the text is not a VCALENDAR document.
pub fn parse_calendar(text: &str, options: &ParseOptions) -> Result<Vec<RawEvent>> {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    let starts_with_calendar = text
        .get(..15)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"));
    if !starts_with_calendar {
        return Err(IcalError::Malformed(
            "document does not start with BEGIN:VCALENDAR".to_string(),
        ));
    }

    let unfolded = unfold(text);
    let calendar = read_calendar(&unfolded).map_err(|e| IcalError::Malformed(e.to_string()))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);
    let events: Vec<VEvent> = vevents
        .into_iter()
        .map(|component| read_vevent(&content_lines(component)))
        .collect();

    tracing::debug!(vevents = events.len(), "parsed calendar");
    Ok(expander::expand_all(events, options))
}

fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if component.name.as_str().eq_ignore_ascii_case("VEVENT") {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

fn content_lines(component: &Component<'_>) -> Vec<ContentLine> {
    component
        .properties
        .iter()
        .map(|property| ContentLine {
            name: property.name.as_str().to_ascii_uppercase(),
            value: property.val.as_str().to_string(),
            params: property
                .params
                .iter()
                .map(|param| {
                    let value = param.val.as_ref().map(|v| v.as_str()).unwrap_or_default();
                    (
                        param.key.as_str().to_ascii_uppercase(),
                        value.trim_matches('"').to_string(),
                    )
                })
                .collect(),
        })
        .collect()
}

fn read_vevent(lines: &[ContentLine]) -> VEvent {
    let mut event = VEvent::default();
    let raw = &mut event.raw;

    for line in lines {
        match line.name.as_str() {
            "UID" => raw.uid = Some(line.value.trim().to_string()).filter(|u| !u.is_empty()),
            "SUMMARY" => raw.summary = Some(unescape_text(&line.value)),
            "DESCRIPTION" => raw.description = Some(unescape_text(&line.value)),
            "DTSTART" => raw.start = line.time(),
            "DTEND" => raw.end = line.time(),
            "RECURRENCE-ID" => raw.recurrence_id = line.time(),
            "DURATION" => raw.duration = parse_duration(&line.value),
            "STATUS" => raw.status = EventStatus::parse(&line.value),
            "ORGANIZER" => raw.organizer = Some(address(line)),
            "ATTENDEE" => raw.attendees.push(Attendee::new(
                address(line),
                line.param("PARTSTAT").map(ParticipationStatus::parse),
            )),
            "RRULE" => event.rrule = Some(line.value.trim().to_string()),
            "RDATE" => event.rdates.extend(line.time_list()),
            "EXDATE" => event.exdates.extend(line.time_list()),
            _ => {}
        }
    }
    event
}

/// Calendar address of an ORGANIZER/ATTENDEE line. Some servers put an opaque
/// id in the value and the real address in the `EMAIL` parameter.
fn address(line: &ContentLine) -> String {
    line.param("EMAIL")
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(&line.value)
        .to_string()
}
