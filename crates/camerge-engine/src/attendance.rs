//! Attendance filtering -- decide which events are the user's own busy time.
//!
//! An event counts when its organizer or any attendee is one of the user's
//! known addresses (compared case-insensitively), or when it carries no
//! participant metadata at all, as is the case for personal calendars.
//! Everything else is dropped before anonymization, so foreign events never
//! contribute busy time.

use std::collections::BTreeSet;

use crate::event::{EventStatus, NormalizedEvent, ParticipationStatus};

/// The user's own calendar addresses, stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownEmails {
    addresses: BTreeSet<String>,
}

impl KnownEmails {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses = emails
            .into_iter()
            .map(|e| normalize_address(e.as_ref()).to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { addresses }
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Case-insensitive membership test. `mailto:` prefixes are ignored.
    pub fn contains(&self, address: &str) -> bool {
        self.addresses
            .contains(&normalize_address(address).to_lowercase())
    }
}

/// Strip surrounding whitespace and a `mailto:` scheme (any case) from a
/// calendar address.
pub fn normalize_address(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => trimmed[7..].trim(),
        _ => trimmed,
    }
}

/// Whether `event` represents the user's own busy time.
pub fn is_attended(event: &NormalizedEvent, known: &KnownEmails) -> bool {
    if event.lacks_participants() {
        return true;
    }
    event
        .organizer_email
        .as_deref()
        .is_some_and(|organizer| known.contains(organizer))
        || event.attendee_emails().any(|email| known.contains(email))
}

/// Output status of an attended event, derived from the user's own replies.
///
/// Any acceptance wins, then any decline, then any tentative or pending reply.
/// With no reply from a known address the event keeps its own status.
pub fn effective_status(event: &NormalizedEvent, known: &KnownEmails) -> EventStatus {
    let replies: Vec<&ParticipationStatus> = event
        .attendees
        .iter()
        .filter(|a| known.contains(&a.email))
        .filter_map(|a| a.partstat.as_ref())
        .collect();

    if replies.contains(&&ParticipationStatus::Accepted) {
        EventStatus::Confirmed
    } else if replies.contains(&&ParticipationStatus::Declined) {
        EventStatus::Cancelled
    } else if replies.iter().any(|p| {
        matches!(
            p,
            ParticipationStatus::Tentative | ParticipationStatus::NeedsAction
        )
    }) {
        EventStatus::Tentative
    } else {
        event.status
    }
}
