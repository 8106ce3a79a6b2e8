//! Merge configuration.

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::anonymizer::DEFAULT_PLACEHOLDER;
use crate::dst::DstPolicy;
use crate::error::{CamergeError, Result};

pub const DEFAULT_NAME: &str = "Merged Calendar";
pub const DEFAULT_DOMAIN: &str = "camerge";

/// Everything a merge needs besides the sources themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Display name of the output calendar.
    pub name: String,
    /// Domain used for the product identifier and for output UIDs.
    pub domain: String,
    /// Output timezone; also used for all-day and floating times.
    pub timezone: Tz,
    /// The user's own addresses.
    pub known_emails: Vec<String>,
    /// Drop events that ended before this date.
    pub skip_events_before: Option<NaiveDate>,
    /// Summary written in place of the original on anonymized sources.
    pub busy_placeholder: String,
    pub dst_policy: DstPolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            timezone: Tz::UTC,
            known_emails: Vec::new(),
            skip_events_before: None,
            busy_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl MergeOptions {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            timezone,
            ..Self::default()
        }
    }

    pub fn with_known_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_emails = emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_events_before(mut self, date: Option<NaiveDate>) -> Self {
        self.skip_events_before = date;
        self
    }

    pub fn with_busy_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.busy_placeholder = placeholder.into();
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    /// Reject options that cannot produce a usable calendar.
    ///
    /// # Errors
    /// Returns `CamergeError::InvalidConfig` for a blank name, domain or placeholder,
    /// or a domain containing whitespace or `@`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CamergeError::InvalidConfig(
                "calendar name must not be empty".to_string(),
            ));
        }
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err(CamergeError::InvalidConfig(
                "calendar domain must not be empty".to_string(),
            ));
        }
        if domain.contains(|c: char| c.is_whitespace() || c == '@') {
            return Err(CamergeError::InvalidConfig(format!(
                "calendar domain '{}' must not contain whitespace or '@'",
                domain
            )));
        }
        if self.busy_placeholder.trim().is_empty() {
            return Err(CamergeError::InvalidConfig(
                "busy placeholder must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
