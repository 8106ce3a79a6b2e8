//! Event records: the raw form handed over by the parser and the normalized
//! form the engine works on.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::dst::{self, DstPolicy};

/// A date or date-time value exactly as it appeared on a calendar property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// Date-only value, used by all-day events.
    Date(NaiveDate),
    /// Local time without a zone; interpreted in the output timezone.
    Floating(NaiveDateTime),
    /// Absolute instant (values ending in `Z`).
    Utc(DateTime<Utc>),
    /// Local time qualified by a `TZID` parameter.
    Zoned { local: NaiveDateTime, tzid: String },
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Resolve this value to an instant.
    ///
    /// Dates resolve to local midnight and floating times to local wall clock,
    /// both in `default_tz`. A `TZID` that is not a known IANA name also falls
    /// back to `default_tz`. Returns `None` only when `policy` is
    /// [`DstPolicy::Skip`] and the local time falls into a DST gap.
    pub fn resolve(&self, default_tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
        match self {
            EventTime::Date(date) => {
                dst::resolve_local(default_tz, date.and_hms_opt(0, 0, 0)?, policy)
            }
            EventTime::Floating(local) => dst::resolve_local(default_tz, *local, policy),
            EventTime::Utc(instant) => Some(*instant),
            EventTime::Zoned { local, tzid } => {
                dst::resolve_local(dst::lookup_timezone(tzid, default_tz), *local, policy)
            }
        }
    }
}

/// Participation status of an attendee (`PARTSTAT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipationStatus {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
    Delegated,
    Other(String),
}

impl ParticipationStatus {
    /// Parse a `PARTSTAT` value, case-insensitively.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" => ParticipationStatus::NeedsAction,
            "ACCEPTED" => ParticipationStatus::Accepted,
            "DECLINED" => ParticipationStatus::Declined,
            "TENTATIVE" => ParticipationStatus::Tentative,
            "DELEGATED" => ParticipationStatus::Delegated,
            other => ParticipationStatus::Other(other.to_string()),
        }
    }
}

/// Status of an event (`STATUS`).
///
/// Variants are ordered by strength: when several records collapse into one
/// output event, the greatest status wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventStatus {
    Cancelled,
    Tentative,
    #[default]
    Confirmed,
}

impl EventStatus {
    /// Parse a `STATUS` value. Unknown values (including to-do statuses) yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CONFIRMED" => Some(EventStatus::Confirmed),
            "TENTATIVE" => Some(EventStatus::Tentative),
            "CANCELLED" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
            EventStatus::Cancelled => "CANCELLED",
        }
    }
}

/// One attendee line of a raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    /// Calendar address, with or without a `mailto:` prefix.
    pub email: String,
    pub partstat: Option<ParticipationStatus>,
}

impl Attendee {
    pub fn new(email: impl Into<String>, partstat: Option<ParticipationStatus>) -> Self {
        Self {
            email: email.into(),
            partstat,
        }
    }
}

/// A single event occurrence as produced by the format parser.
///
/// Recurring series arrive already expanded: every occurrence is its own
/// `RawEvent`, tagged with `recurrence_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    /// `DURATION`, consulted only when `end` is absent.
    pub duration: Option<Duration>,
    pub organizer: Option<String>,
    pub attendees: Vec<Attendee>,
    pub status: Option<EventStatus>,
    pub recurrence_id: Option<EventTime>,
}

/// One input calendar: its identifier, anonymization flag and parsed events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSource {
    /// Opaque identifier, typically the location the calendar was loaded from.
    pub id: String,
    /// Replace summaries with the busy placeholder for this source.
    pub anonymize: bool,
    pub events: Vec<RawEvent>,
}

impl CalendarSource {
    pub fn new(id: impl Into<String>, anonymize: bool, events: Vec<RawEvent>) -> Self {
        Self {
            id: id.into(),
            anonymize,
            events,
        }
    }
}

/// The engine's internal unit of work.
///
/// Invariant: `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: Option<String>,
    /// Bare addresses with `mailto:` stripped, compared case-insensitively.
    pub organizer_email: Option<String>,
    pub attendees: Vec<Attendee>,
    pub uid: Option<String>,
    pub recurrence_id: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub source_anonymous: bool,
}

impl NormalizedEvent {
    pub fn attendee_emails(&self) -> impl Iterator<Item = &str> {
        self.attendees.iter().map(|a| a.email.as_str())
    }

    /// True when the event carries neither an organizer nor attendees.
    pub fn lacks_participants(&self) -> bool {
        self.organizer_email.is_none() && self.attendees.is_empty()
    }
}
