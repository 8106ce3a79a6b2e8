//! Merge N calendar sources into a single busy/free calendar.
//!
//! Each source runs through the same per-event pipeline:
//!
//! 1. [`adapt`] -- raw entry → [`NormalizedEvent`] (malformed entries skipped)
//! 2. [`TemporalWindow`] -- drop events that ended before the cutoff
//! 3. [`attendance`] -- drop events the user is not part of, derive status
//! 4. [`anonymize`] -- strip content on anonymized sources
//!
//! The surviving events of all sources are then collapsed on the exact
//! `(start, end, summary)` triple and ordered by that same triple. Overlapping
//! but distinct events are kept apart so double bookings stay visible.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::adapter::adapt;
use crate::anonymizer::anonymize;
use crate::attendance::{self, KnownEmails};
use crate::error::{CamergeError, Result, SourceError};
use crate::event::{CalendarSource, NormalizedEvent};
use crate::options::MergeOptions;
use crate::output::{obfuscate_uid, MergedCalendar, OutputEvent};
use crate::window::TemporalWindow;

/// A merged calendar together with the sources that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub calendar: MergedCalendar,
    pub failures: Vec<SourceError>,
}

impl MergeOutcome {
    /// True when at least one source failed and is missing from the calendar.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Per-source counters, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub malformed: usize,
    pub before_cutoff: usize,
    pub not_attended: usize,
    pub duplicate_uid: usize,
    pub kept: usize,
}

/// Merge fully loaded sources.
///
/// # Errors
/// Returns `CamergeError::NoSources` if `sources` is empty and
/// `CamergeError::InvalidConfig` if `options` fail validation. Nothing is
/// processed in either case.
pub fn merge(options: &MergeOptions, sources: &[CalendarSource]) -> Result<MergedCalendar> {
    if sources.is_empty() {
        return Err(CamergeError::NoSources);
    }
    options.validate()?;
    Ok(merge_validated(options, sources))
}

/// Merge whatever sources loaded successfully and report the ones that did not.
///
/// A failed source never aborts the merge of the others; if every source
/// failed, the result is an empty calendar plus the full failure list.
///
/// # Errors
/// Same configuration errors as [`merge`].
pub fn merge_partial(
    options: &MergeOptions,
    inputs: Vec<std::result::Result<CalendarSource, SourceError>>,
) -> Result<MergeOutcome> {
    if inputs.is_empty() {
        return Err(CamergeError::NoSources);
    }
    options.validate()?;

    let mut sources = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    for input in inputs {
        match input {
            Ok(source) => sources.push(source),
            Err(err) => {
                tracing::warn!(source = err.source_id(), error = %err, "skipping calendar source");
                failures.push(err);
            }
        }
    }

    Ok(MergeOutcome {
        calendar: merge_validated(options, &sources),
        failures,
    })
}

fn merge_validated(options: &MergeOptions, sources: &[CalendarSource]) -> MergedCalendar {
    let known = KnownEmails::new(&options.known_emails);
    if known.is_empty() {
        tracing::warn!("no known emails configured; only events without participants will be kept");
    }
    let window = TemporalWindow::new(options.skip_events_before, options.timezone);
    let domain = options.domain.trim();

    let outputs = sources.iter().flat_map(|source| {
        let (events, stats) = process_source(source, options, &known, &window);
        tracing::debug!(
            source = %source.id,
            anonymize = source.anonymize,
            malformed = stats.malformed,
            before_cutoff = stats.before_cutoff,
            not_attended = stats.not_attended,
            duplicate_uid = stats.duplicate_uid,
            kept = stats.kept,
            "processed calendar source"
        );
        events
            .into_iter()
            .map(|event| OutputEvent::from_normalized(&event, &source.id, domain))
            .collect::<Vec<_>>()
    });

    let events = disambiguate_uids(dedup_and_sort(outputs), domain);
    tracing::info!(
        sources = sources.len(),
        events = events.len(),
        "merged calendar"
    );
    MergedCalendar::build(options, events)
}

/// Run one source through adapter, window, attendance and anonymizer.
///
/// Within the source, records sharing `(uid, start)` are the same occurrence
/// and only the first is kept.
pub fn process_source(
    source: &CalendarSource,
    options: &MergeOptions,
    known: &KnownEmails,
    window: &TemporalWindow,
) -> (Vec<NormalizedEvent>, SourceStats) {
    let mut stats = SourceStats::default();
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    let mut events = Vec::new();

    for raw in &source.events {
        let Some(mut event) = adapt(raw, source.anonymize, options.timezone, options.dst_policy)
        else {
            tracing::debug!(source = %source.id, uid = ?raw.uid, "skipping event without usable time range");
            stats.malformed += 1;
            continue;
        };
        if !window.admits(&event) {
            stats.before_cutoff += 1;
            continue;
        }
        if !attendance::is_attended(&event, known) {
            stats.not_attended += 1;
            continue;
        }
        if let Some(uid) = &event.uid {
            if !seen.insert((uid.clone(), event.start)) {
                stats.duplicate_uid += 1;
                continue;
            }
        }
        event.status = attendance::effective_status(&event, known);
        events.push(anonymize(event, &options.busy_placeholder));
        stats.kept += 1;
    }

    (events, stats)
}

/// Collapse events with identical `(start, end, summary)` and sort by that triple.
///
/// A collapsed event keeps the strongest status and the smallest UID of its
/// group, so the result does not depend on input order.
pub fn dedup_and_sort<I>(events: I) -> Vec<OutputEvent>
where
    I: IntoIterator<Item = OutputEvent>,
{
    let mut slots: BTreeMap<(DateTime<Utc>, DateTime<Utc>, String), OutputEvent> = BTreeMap::new();
    for event in events {
        match slots.entry((event.start, event.end, event.summary.clone())) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                let kept = slot.get_mut();
                kept.status = kept.status.max(event.status);
                if event.uid < kept.uid {
                    kept.uid = event.uid;
                }
            }
        }
    }
    slots.into_values().collect()
}

/// Give every event a distinct UID.
///
/// The same meeting on two calendars can survive dedup with different
/// summaries but the same source UID; later ones get a re-hashed UID.
fn disambiguate_uids(mut events: Vec<OutputEvent>, domain: &str) -> Vec<OutputEvent> {
    let mut used: HashSet<String> = HashSet::with_capacity(events.len());
    for event in &mut events {
        let mut attempt = 1;
        while !used.insert(event.uid.clone()) {
            event.uid = obfuscate_uid(&format!("{}#{}", event.uid, attempt), domain);
            attempt += 1;
        }
    }
    events
}
