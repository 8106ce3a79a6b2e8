//! # camerge-engine
//!
//! Merge several private calendars into one shareable busy/free calendar.
//!
//! The engine is a pure, synchronous transformation: callers hand it already
//! fetched and parsed sources, each with an anonymize flag, and get back a
//! [`MergedCalendar`] ready for encoding. No I/O happens here.
//!
//! ## Modules
//!
//! - [`event`] -- raw and normalized event records, calendar sources
//! - [`adapter`] -- raw entry → normalized event, all-day normalization
//! - [`window`] -- skip events that ended before a cutoff date
//! - [`attendance`] -- keep only the user's own events, derive status from replies
//! - [`anonymizer`] -- replace identifying content with a placeholder
//! - [`merge`] -- per-source pipeline, cross-source dedup and ordering
//! - [`output`] -- the merged calendar aggregate, UID obfuscation
//! - [`options`] -- merge configuration
//! - [`dst`] -- DST gap policies and timezone lookup
//! - [`error`] -- Error types

pub mod adapter;
pub mod anonymizer;
pub mod attendance;
pub mod dst;
pub mod error;
pub mod event;
pub mod merge;
pub mod options;
pub mod output;
pub mod window;

pub use dst::DstPolicy;
pub use error::{CamergeError, SourceError};
pub use event::{
    Attendee, CalendarSource, EventStatus, EventTime, NormalizedEvent, ParticipationStatus,
    RawEvent,
};
pub use merge::{merge, merge_partial, MergeOutcome};
pub use options::MergeOptions;
pub use output::{MergedCalendar, OutputEvent};
