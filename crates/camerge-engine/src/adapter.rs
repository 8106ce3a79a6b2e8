//! Event model adapter -- turn a parsed calendar entry into a [`NormalizedEvent`].
//!
//! Entries without a usable time range are skipped, not reported as errors.
//! All-day entries cover whole days in the output timezone, with an exclusive
//! end date as in RFC 5545.

use chrono_tz::Tz;

use crate::attendance::normalize_address;
use crate::dst::DstPolicy;
use crate::event::{Attendee, EventTime, NormalizedEvent, RawEvent};

/// Normalize one raw entry from a source with the given `anonymous` flag.
///
/// Returns `None` when the entry has no start, when a local time cannot be
/// resolved under `policy`, when its end is out of range, or when it ends
/// before it starts.
///
/// When `DTEND` is absent the end is derived from `DURATION`, else it is the
/// day after a date-only start, else the start itself.
pub fn adapt(
    raw: &RawEvent,
    anonymous: bool,
    timezone: Tz,
    policy: DstPolicy,
) -> Option<NormalizedEvent> {
    let start_time = raw.start.as_ref()?;
    let start = start_time.resolve(timezone, policy)?;

    let end = match (&raw.end, raw.duration) {
        (Some(end), _) => end.resolve(timezone, policy)?,
        (None, Some(duration)) => start.checked_add_signed(duration)?,
        (None, None) => match start_time {
            EventTime::Date(date) => EventTime::Date(date.succ_opt()?).resolve(timezone, policy)?,
            _ => start,
        },
    };

    if end < start {
        return None;
    }

    let organizer_email = raw
        .organizer
        .as_deref()
        .map(normalize_address)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let attendees = raw
        .attendees
        .iter()
        .filter_map(|a| {
            let email = normalize_address(&a.email);
            (!email.is_empty()).then(|| Attendee::new(email, a.partstat.clone()))
        })
        .collect();

    Some(NormalizedEvent {
        start,
        end,
        summary: raw.summary.clone().unwrap_or_default(),
        description: raw.description.clone(),
        organizer_email,
        attendees,
        uid: raw.uid.clone(),
        recurrence_id: raw
            .recurrence_id
            .as_ref()
            .and_then(|r| r.resolve(timezone, policy)),
        status: raw.status.unwrap_or_default(),
        source_anonymous: anonymous,
    })
}
