//! Error types for loading, parsing and fetching calendars.

use camerge_engine::SourceError;
use thiserror::Error;

/// Errors that can occur while turning a calendar location into events.
#[derive(Error, Debug)]
pub enum IcalError {
    /// The text is not an iCalendar document at all.
    #[error("Malformed calendar: {0}")]
    Malformed(String),

    /// A property value could not be understood.
    /// Includes the property name for context.
    #[error("Invalid {property} value '{value}'")]
    InvalidValue { property: String, value: String },

    /// An RRULE could not be expanded.
    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    /// The location uses a scheme we cannot load from.
    #[error("Unsupported calendar location: {0}")]
    UnsupportedLocation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IcalError {
    /// Attach a source identifier, classifying the error as a fetch or parse failure.
    pub fn into_source_error(self, source_id: impl Into<String>) -> SourceError {
        let source_id = source_id.into();
        let message = self.to_string();
        match self {
            IcalError::Malformed(_) | IcalError::InvalidValue { .. } | IcalError::InvalidRule(_) => {
                SourceError::Parse { source_id, message }
            }
            IcalError::UnsupportedLocation(_) | IcalError::Http(_) | IcalError::Io(_) => {
                SourceError::Fetch { source_id, message }
            }
        }
    }
}

/// Convenience alias used throughout camerge-ical.
pub type Result<T> = std::result::Result<T, IcalError>;
