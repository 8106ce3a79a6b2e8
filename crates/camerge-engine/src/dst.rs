//! DST transition policies and local-time resolution.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Policy for local times that fall into a DST gap (e.g., 02:30 during spring forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop events whose local time does not exist.
    Skip,
    /// Interpret the time with the offset in force before the gap, which moves
    /// it forward by the gap length (RFC 5545 section 3.3.5).
    #[default]
    ShiftForward,
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => {
                // Three hours earlier is still before the transition.
                let before = tz
                    .from_local_datetime(&(local - Duration::hours(3)))
                    .earliest()?
                    .offset()
                    .fix();
                let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
                Some(Utc.from_utc_datetime(&utc))
            }
        },
    }
}

/// Look up an IANA timezone name, falling back to `default` for unknown names
/// such as the Windows zone identifiers some servers emit.
pub fn lookup_timezone(tzid: &str, default: Tz) -> Tz {
    let trimmed = tzid.trim().trim_matches('"');
    match trimmed.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::debug!(tzid = trimmed, fallback = %default, "unknown TZID, using default timezone");
            default
        }
    }
}

/// Parse an IANA timezone name for use as the output timezone.
pub fn parse_timezone(name: &str) -> crate::error::Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| crate::error::CamergeError::InvalidTimezone(name.to_string()))
}
