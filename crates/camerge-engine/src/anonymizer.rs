//! Strip identifying content from events of anonymized sources.

use crate::event::NormalizedEvent;

/// Summary used for anonymized events unless configured otherwise.
pub const DEFAULT_PLACEHOLDER: &str = "busy";

/// Replace the summary with `placeholder` and drop description, organizer
/// and attendees when the event comes from an anonymized source.
///
/// Events from other sources are returned untouched. The original values are
/// dropped, not kept aside.
pub fn anonymize(mut event: NormalizedEvent, placeholder: &str) -> NormalizedEvent {
    if event.source_anonymous {
        event.summary = placeholder.to_string();
        event.description = None;
        event.organizer_email = None;
        event.attendees.clear();
    }
    event
}
