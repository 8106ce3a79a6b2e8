//! Error types for merge operations.

use thiserror::Error;

/// Configuration errors. These fail a merge before any event is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CamergeError {
    #[error("No calendar sources supplied")]
    NoSources,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// A failure confined to a single source calendar.
///
/// These never abort a merge; they are reported alongside the partial result
/// in [`MergeOutcome`](crate::merge::MergeOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The calendar could not be retrieved (network, filesystem, bad location).
    #[error("Failed to fetch calendar {source_id}: {message}")]
    Fetch { source_id: String, message: String },

    /// The calendar was retrieved but its text is not a valid calendar.
    #[error("Failed to parse calendar {source_id}: {message}")]
    Parse { source_id: String, message: String },
}

impl SourceError {
    /// Identifier of the source that failed.
    pub fn source_id(&self) -> &str {
        match self {
            SourceError::Fetch { source_id, .. } | SourceError::Parse { source_id, .. } => source_id,
        }
    }
}

pub type Result<T> = std::result::Result<T, CamergeError>;
