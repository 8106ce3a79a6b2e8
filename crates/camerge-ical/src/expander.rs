//! Recurrence expansion -- turn recurring VEVENTs into concrete occurrences.
//!
//! Wraps the `rrule` crate (v0.13) for RRULE evaluation. RDATE and EXDATE are
//! applied on top of the generated instants, and VEVENTs carrying a
//! `RECURRENCE-ID` replace the occurrence they override.

use std::collections::HashSet;

use camerge_engine::dst::{self, DstPolicy};
use camerge_engine::{EventTime, RawEvent};
use chrono::{DateTime, Days, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{IcalError, Result};
use crate::parser::{ParseOptions, VEvent};

const RRULE_DATE_TIME: &str = "%Y%m%dT%H%M%S";

/// How long each occurrence of a series lasts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Span {
    /// All-day series: occurrences cover whole local days.
    Days(i64),
    /// Timed series: fixed absolute length.
    Exact(Duration),
}

impl Span {
    fn approximate(self) -> Duration {
        match self {
            Span::Days(days) => Duration::try_days(days).unwrap_or(Duration::MAX),
            Span::Exact(duration) => duration,
        }
    }
}

/// Expand every recurring master and drop the occurrences that have overrides.
///
/// A master whose rule cannot be evaluated is kept as a single event.
pub(crate) fn expand_all(events: Vec<VEvent>, options: &ParseOptions) -> Vec<RawEvent> {
    let overrides: HashSet<(String, DateTime<Utc>)> = events
        .iter()
        .filter_map(|e| override_key(&e.raw, options.timezone))
        .collect();

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        let recurring = event.rrule.is_some() || !event.rdates.is_empty();
        if !recurring || event.raw.recurrence_id.is_some() {
            out.push(event.raw);
            continue;
        }

        match expand_series(&event, options) {
            Ok(occurrences) => out.extend(
                occurrences
                    .into_iter()
                    .filter(|o| override_key(o, options.timezone).is_none_or(|k| !overrides.contains(&k))),
            ),
            Err(err) => {
                tracing::warn!(uid = ?event.raw.uid, error = %err, "could not expand recurring event, keeping first occurrence");
                out.push(event.raw);
            }
        }
    }
    out
}

fn override_key(raw: &RawEvent, timezone: Tz) -> Option<(String, DateTime<Utc>)> {
    let uid = raw.uid.as_ref()?;
    let instant = raw
        .recurrence_id
        .as_ref()?
        .resolve(timezone, DstPolicy::ShiftForward)?;
    Some((uid.clone(), instant))
}

/// Expand one recurring master into occurrences within the configured window.
///
/// # Errors
/// Returns `IcalError::InvalidRule` if the master has no DTSTART or its RRULE
/// cannot be parsed.
pub(crate) fn expand_series(event: &VEvent, options: &ParseOptions) -> Result<Vec<RawEvent>> {
    let start = event
        .raw
        .start
        .as_ref()
        .ok_or_else(|| IcalError::InvalidRule("recurring event without DTSTART".to_string()))?;
    let (series_tz, local_start) = anchor(start, options.timezone);
    let first = dst::resolve_local(series_tz, local_start, DstPolicy::ShiftForward)
        .ok_or_else(|| IcalError::InvalidRule("DTSTART cannot be resolved".to_string()))?;
    let span = span_of(&event.raw, options.timezone);

    let mut instants = match &event.rrule {
        Some(rule) => expand_rule(rule, series_tz, local_start, span, options)?,
        None => vec![first],
    };

    instants.extend(
        event
            .rdates
            .iter()
            .filter_map(|r| r.resolve(options.timezone, DstPolicy::ShiftForward)),
    );
    let excluded: HashSet<DateTime<Utc>> = event
        .exdates
        .iter()
        .filter_map(|x| x.resolve(options.timezone, DstPolicy::ShiftForward))
        .collect();
    instants.retain(|i| !excluded.contains(i));
    instants.retain(|i| options.admits(*i, span.approximate()));
    instants.sort();
    instants.dedup();
    instants.truncate(usize::from(options.max_instances));

    Ok(instants
        .into_iter()
        .filter_map(|instant| occurrence(&event.raw, instant, span, options.timezone))
        .collect())
}

/// Evaluate an RRULE anchored at `local_start` in `tz`.
fn expand_rule(
    rule: &str,
    tz: Tz,
    local_start: NaiveDateTime,
    span: Span,
    options: &ParseOptions,
) -> Result<Vec<DateTime<Utc>>> {
    if rule.trim().is_empty() {
        return Err(IcalError::InvalidRule("empty RRULE string".to_string()));
    }

    // Build the iCalendar RRULE text block, as `rrule` parses it.
    let rrule_text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        tz.name(),
        local_start.format(RRULE_DATE_TIME),
        normalize_until(rule, tz)
    );

    let mut rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| IcalError::InvalidRule(format!("{}", e)))?;

    // Occurrences that started before the window may still overlap it.
    if let Some(after) = options
        .expand_from
        .and_then(|from| from.checked_sub_signed(span.approximate()))
    {
        rrule_set = rrule_set.after(after.with_timezone(&rrule::Tz::UTC));
    }
    if let Some(until) = options.expand_until {
        rrule_set = rrule_set.before(until.with_timezone(&rrule::Tz::UTC));
    }

    let result = rrule_set.all(options.max_instances);
    if result.limited {
        tracing::debug!(rule, limit = options.max_instances, "recurrence expansion hit the instance limit");
    }

    Ok(result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect())
}

/// Rewrite `UNTIL` so that it shares the series timezone.
///
/// `rrule` rejects an UNTIL whose timezone differs from DTSTART's, so a UTC
/// UNTIL is converted to the series' wall-clock time (and keeps its `Z` only
/// when the series itself is UTC). Date-only UNTIL values include the whole day.
fn normalize_until(rule: &str, tz: Tz) -> String {
    rule.trim()
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("UNTIL") => {
                match until_local(value.trim(), tz) {
                    Some(local) if tz == Tz::UTC => format!("UNTIL={}Z", local.format(RRULE_DATE_TIME)),
                    Some(local) => format!("UNTIL={}", local.format(RRULE_DATE_TIME)),
                    None => part.to_string(),
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn until_local(value: &str, tz: Tz) -> Option<NaiveDateTime> {
    match crate::values::parse_time("UNTIL", value, None, None).ok()? {
        EventTime::Date(date) => date.and_hms_opt(23, 59, 59),
        EventTime::Utc(instant) => Some(instant.with_timezone(&tz).naive_local()),
        EventTime::Floating(local) | EventTime::Zoned { local, .. } => Some(local),
    }
}

/// Timezone and wall-clock time a series is anchored to.
fn anchor(start: &EventTime, default_tz: Tz) -> (Tz, NaiveDateTime) {
    match start {
        EventTime::Date(date) => (default_tz, date.and_time(chrono::NaiveTime::MIN)),
        EventTime::Floating(local) => (default_tz, *local),
        EventTime::Utc(instant) => (Tz::UTC, instant.naive_utc()),
        EventTime::Zoned { local, tzid } => (dst::lookup_timezone(tzid, default_tz), *local),
    }
}

fn span_of(raw: &RawEvent, timezone: Tz) -> Span {
    if let Some(EventTime::Date(start)) = &raw.start {
        let days = match (&raw.end, raw.duration) {
            (Some(EventTime::Date(end)), _) => (*end - *start).num_days(),
            (None, Some(duration)) => duration.num_days(),
            _ => 1,
        };
        return Span::Days(days.max(1));
    }

    let resolve = |t: &EventTime| t.resolve(timezone, DstPolicy::ShiftForward);
    let duration = match (&raw.start, &raw.end, raw.duration) {
        (Some(start), Some(end), _) => resolve(start)
            .zip(resolve(end))
            .map(|(s, e)| e - s)
            .unwrap_or_else(Duration::zero),
        (_, None, Some(duration)) => duration,
        _ => Duration::zero(),
    };
    Span::Exact(duration.max(Duration::zero()))
}

/// Materialize the occurrence of `master` starting at `instant`, or `None`
/// if its end falls outside the representable range.
fn occurrence(
    master: &RawEvent,
    instant: DateTime<Utc>,
    span: Span,
    timezone: Tz,
) -> Option<RawEvent> {
    let (start, end, recurrence_id) = match span {
        Span::Days(days) => {
            let date = instant.with_timezone(&timezone).date_naive();
            (
                EventTime::Date(date),
                EventTime::Date(date.checked_add_days(Days::new(days.unsigned_abs()))?),
                EventTime::Date(date),
            )
        }
        Span::Exact(duration) => (
            EventTime::Utc(instant),
            EventTime::Utc(instant.checked_add_signed(duration)?),
            EventTime::Utc(instant),
        ),
    };

    Some(RawEvent {
        start: Some(start),
        end: Some(end),
        duration: None,
        recurrence_id: Some(recurrence_id),
        ..master.clone()
    })
}
