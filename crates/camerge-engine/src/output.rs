//! Output aggregate handed to the format encoder.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::event::{EventStatus, NormalizedEvent};
use crate::options::MergeOptions;

/// One busy block of the merged calendar. Carries no participant data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    /// Obfuscated identifier, `<md5-hex>@<domain>`.
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub status: EventStatus,
}

impl OutputEvent {
    /// Reduce a processed event to its output form.
    ///
    /// The UID digest covers the source UID and, for recurrence instances,
    /// the occurrence instant. Events without a UID hash the source id and
    /// their time range, never their content.
    pub fn from_normalized(event: &NormalizedEvent, source_id: &str, domain: &str) -> Self {
        let seed = match (&event.uid, event.recurrence_id) {
            (Some(uid), None) => uid.clone(),
            (Some(uid), Some(instance)) => format!("{}/{}", uid, instance.to_rfc3339()),
            (None, _) => format!(
                "{}/{}/{}",
                source_id,
                event.start.to_rfc3339(),
                event.end.to_rfc3339()
            ),
        };
        Self {
            uid: obfuscate_uid(&seed, domain),
            start: event.start,
            end: event.end,
            summary: event.summary.clone(),
            status: event.status,
        }
    }
}

/// The merged calendar: metadata plus events sorted by `(start, end, summary)`
/// with no two events sharing that triple.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCalendar {
    pub name: String,
    pub domain: String,
    pub product_id: String,
    pub timezone: Tz,
    pub events: Vec<OutputEvent>,
}

impl MergedCalendar {
    pub(crate) fn build(options: &MergeOptions, events: Vec<OutputEvent>) -> Self {
        let domain = options.domain.trim().to_string();
        Self {
            name: options.name.trim().to_string(),
            product_id: product_id(&domain),
            domain,
            timezone: options.timezone,
            events,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Stable `PRODID` for calendars published under `domain`.
pub fn product_id(domain: &str) -> String {
    format!("-//{}//camerge//EN", domain)
}

/// Hash `seed` so the original identifier does not leak, and qualify it with `domain`.
pub fn obfuscate_uid(seed: &str, domain: &str) -> String {
    format!("{:x}@{}", md5::compute(seed.as_bytes()), domain)
}
