//! Property value decoding: date-times, durations and escaped text.

use camerge_engine::EventTime;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{IcalError, Result};

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Decode a DATE or DATE-TIME value.
///
/// `value_type` is the `VALUE` parameter and `tzid` the `TZID` parameter, if
/// present. Date-only values are recognised by `VALUE=DATE` or by their
/// eight-digit shape.
pub fn parse_time(
    property: &str,
    value: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
) -> Result<EventTime> {
    let value = value.trim();
    let invalid = || IcalError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    };

    let is_date = value_type.is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if is_date {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(EventTime::Date)
            .map_err(|_| invalid());
    }

    if let Some(utc) = value.strip_suffix(['Z', 'z']) {
        return NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT)
            .map(|dt| EventTime::Utc(dt.and_utc()))
            .map_err(|_| invalid());
    }

    let local = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|_| invalid())?;
    Ok(match tzid {
        Some(tzid) if !tzid.trim().is_empty() => EventTime::Zoned {
            local,
            tzid: tzid.trim().to_string(),
        },
        _ => EventTime::Floating(local),
    })
}

/// Decode a comma-separated list of DATE/DATE-TIME values (EXDATE, RDATE).
pub fn parse_time_list(
    property: &str,
    value: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
) -> Result<Vec<EventTime>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_time(property, v, value_type, tzid))
        .collect()
}

/// Decode an RFC 5545 DURATION value such as `PT1H30M`, `P1D` or `-PT15M`.
///
/// Values too large for a [`Duration`] are rejected like malformed ones.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix(['P', 'p'])?;

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            '0'..='9' => digits.push(c),
            'T' if digits.is_empty() && !in_time => in_time = true,
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let component = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n),
                    ('D', false) => Duration::try_days(n),
                    ('H', true) => Duration::try_hours(n),
                    ('M', true) => Duration::try_minutes(n),
                    ('S', true) => Duration::try_seconds(n),
                    _ => return None,
                };
                total = total.checked_add(&component?)?;
                saw_component = true;
            }
        }
    }

    if !digits.is_empty() || !saw_component {
        return None;
    }
    Some(if negative { -total } else { total })
}

/// Undo TEXT escaping (`\\`, `\;`, `\,`, `\n`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
