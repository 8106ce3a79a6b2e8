//! `camerge.toml` configuration, with command-line overrides on top.
//!
//! ```toml
//! name = "My Availability"
//! domain = "my.calendar.example.com"
//! timezone = "Europe/Prague"
//! known_emails = ["me@example.com", "otherme@example.com"]
//! skip_events_before = "2021-01-01"
//!
//! [[sources]]
//! location = "https://calendar.google.com/calendar/ical/.../basic.ics"
//! anonymize = true
//!
//! [[sources]]
//! location = "webcal://p30-caldav.icloud.com/published/2/..."
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use camerge_engine::anonymizer::DEFAULT_PLACEHOLDER;
use camerge_engine::dst::parse_timezone;
use camerge_engine::options::{DEFAULT_DOMAIN, DEFAULT_NAME};
use camerge_engine::window::TemporalWindow;
use camerge_engine::MergeOptions;
use camerge_ical::parser::DEFAULT_MAX_INSTANCES;
use camerge_ical::{ParseOptions, SourceSpec};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

pub const DEFAULT_HORIZON_DAYS: u32 = 365;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub name: String,
    pub domain: String,
    /// IANA timezone name.
    pub timezone: String,
    pub busy_placeholder: String,
    pub known_emails: Vec<String>,
    /// `"YYYY-MM-DD"`.
    pub skip_events_before: Option<NaiveDate>,
    /// How far into the future recurring series are expanded.
    pub horizon_days: u32,
    pub max_instances: u16,
    pub timeout_secs: u64,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub location: String,
    #[serde(default)]
    pub anonymize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            timezone: "UTC".to_string(),
            busy_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            known_emails: Vec::new(),
            skip_events_before: None,
            horizon_days: DEFAULT_HORIZON_DAYS,
            max_instances: DEFAULT_MAX_INSTANCES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sources: Vec::new(),
        }
    }
}

/// Values given on the command line. `None`/empty means "keep the file's value".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sources: Vec<String>,
    pub anonymized_sources: Vec<String>,
    pub emails: Vec<String>,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub timezone: Option<String>,
    pub skip_before: Option<NaiveDate>,
    pub placeholder: Option<String>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Layer command-line values over the file. Sources and emails given on
    /// the command line are added to the configured ones.
    pub fn apply(&mut self, overrides: Overrides) {
        self.sources.extend(overrides.sources.into_iter().map(|location| SourceEntry {
            location,
            anonymize: false,
        }));
        self.sources.extend(
            overrides
                .anonymized_sources
                .into_iter()
                .map(|location| SourceEntry {
                    location,
                    anonymize: true,
                }),
        );
        self.known_emails.extend(overrides.emails);

        if let Some(name) = overrides.name {
            self.name = name;
        }
        if let Some(domain) = overrides.domain {
            self.domain = domain;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if overrides.skip_before.is_some() {
            self.skip_events_before = overrides.skip_before;
        }
        if let Some(placeholder) = overrides.placeholder {
            self.busy_placeholder = placeholder;
        }
    }

    /// Engine options, validated.
    pub fn merge_options(&self) -> Result<MergeOptions> {
        if self.sources.is_empty() {
            bail!("No calendar sources configured. Add [[sources]] to the config or pass --source/--anonymize.");
        }
        let timezone = parse_timezone(&self.timezone)?;
        let options = MergeOptions::new(&self.name, &self.domain, timezone)
            .with_known_emails(self.known_emails.iter().cloned())
            .with_skip_events_before(self.skip_events_before)
            .with_busy_placeholder(&self.busy_placeholder);
        options.validate()?;
        Ok(options)
    }

    /// Parser options: recurring series are expanded from the cutoff date
    /// (if any) up to `horizon_days` past `now`.
    pub fn parse_options(&self, now: DateTime<Utc>) -> Result<ParseOptions> {
        let timezone = parse_timezone(&self.timezone)?;
        Ok(ParseOptions {
            timezone,
            expand_from: TemporalWindow::new(self.skip_events_before, timezone).cutoff(),
            expand_until: Some(now + chrono::Duration::days(i64::from(self.horizon_days))),
            max_instances: self.max_instances,
        })
    }

    pub fn source_specs(&self) -> Vec<SourceSpec> {
        self.sources
            .iter()
            .map(|s| SourceSpec::new(s.location.trim(), s.anonymize))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
