//! # camerge-ical
//!
//! iCalendar collaborators for [`camerge_engine`]: load calendars from URLs,
//! files or inline data, parse them into raw events with recurrences already
//! expanded, and encode a merged calendar back to iCalendar text.
//!
//! ## Quick start
//!
//! ```rust
//! use camerge_engine::{merge, CalendarSource, MergeOptions};
//! use camerge_ical::{encode, parse_calendar, ParseOptions};
//! use chrono::{TimeZone, Utc};
//!
//! let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\n\
//!            DTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
//!            SUMMARY:Dentist\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
//! let events = parse_calendar(ics, &ParseOptions::default()).unwrap();
//! let merged = merge(
//!     &MergeOptions::default(),
//!     &[CalendarSource::new("personal", true, events)],
//! )
//! .unwrap();
//!
//! let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let text = encode(&merged, stamp);
//! assert!(text.contains("SUMMARY:busy"));
//! assert!(!text.contains("Dentist"));
//! ```
//!
//! ## Modules
//!
//! - [`parser`] -- iCalendar text → raw events
//! - `expander` -- RRULE/RDATE/EXDATE expansion, RECURRENCE-ID overrides
//! - [`encoder`] -- merged calendar → iCalendar text
//! - [`fetch`] -- `https`, `http`, `webcal`, `file` and `data` locations
//! - [`values`] -- date-time, duration and text value decoding
//! - [`error`] -- Error types

pub mod encoder;
pub mod error;
mod expander;
pub mod fetch;
pub mod parser;
pub mod values;

pub use encoder::encode;
pub use error::IcalError;
pub use fetch::{Fetcher, Location, SourceSpec};
pub use parser::{parse_calendar, ParseOptions};
