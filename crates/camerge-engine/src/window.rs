//! Temporal window filter -- drop events that ended before a cutoff date.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::dst::{self, DstPolicy};
use crate::event::NormalizedEvent;

/// Lower bound on event end times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalWindow {
    cutoff: Option<DateTime<Utc>>,
}

impl TemporalWindow {
    /// A window that admits every event.
    pub fn unbounded() -> Self {
        Self { cutoff: None }
    }

    /// Cut off at the start of `skip_before` in `timezone`; `None` admits everything.
    pub fn new(skip_before: Option<NaiveDate>, timezone: Tz) -> Self {
        let cutoff = skip_before
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|midnight| dst::resolve_local(timezone, midnight, DstPolicy::ShiftForward));
        Self { cutoff }
    }

    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.cutoff
    }

    /// False only for events whose end lies strictly before the cutoff.
    pub fn admits(&self, event: &NormalizedEvent) -> bool {
        self.cutoff.is_none_or(|cutoff| event.end >= cutoff)
    }
}
