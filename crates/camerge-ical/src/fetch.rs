//! Calendar retrieval: turn a source location into calendar text and then
//! into a [`CalendarSource`].
//!
//! Supported locations:
//!
//! - `https://…`, `http://…` -- fetched over HTTP
//! - `webcal://…` -- fetched as `https://…`
//! - `file://<path>` -- read from the filesystem
//! - `data://<calendar text>` -- the calendar itself, inline

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use camerge_engine::{CalendarSource, SourceError};

use crate::error::{IcalError, Result};
use crate::parser::{parse_calendar, ParseOptions};

/// Default per-request timeout for HTTP sources.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A source calendar to load, with its anonymize flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub location: String,
    pub anonymize: bool,
}

impl SourceSpec {
    pub fn new(location: impl Into<String>, anonymize: bool) -> Self {
        Self {
            location: location.into(),
            anonymize,
        }
    }
}

/// Where calendar text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<'a> {
    Http(String),
    File(PathBuf),
    Data(&'a str),
}

impl<'a> Location<'a> {
    /// Classify a location string by its scheme.
    ///
    /// # Errors
    /// Returns `IcalError::UnsupportedLocation` for any other scheme.
    pub fn parse(location: &'a str) -> Result<Self> {
        let trimmed = location.trim_start();
        let scheme_len = trimmed.find("://").map(|i| i + 3);
        let (scheme, rest) = match scheme_len {
            Some(len) => (trimmed[..len].to_ascii_lowercase(), &trimmed[len..]),
            None => return Err(IcalError::UnsupportedLocation(redact(location))),
        };
        match scheme.as_str() {
            "https://" | "http://" => Ok(Location::Http(trimmed.trim_end().to_string())),
            "webcal://" => Ok(Location::Http(format!("https://{}", rest.trim_end()))),
            "file://" => Ok(Location::File(PathBuf::from(rest.trim_end()))),
            "data://" => Ok(Location::Data(rest)),
            _ => Err(IcalError::UnsupportedLocation(redact(location))),
        }
    }
}

/// Shorten a location for logs: private calendar URLs embed secret tokens.
pub fn redact(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.get(..7).is_some_and(|s| s.eq_ignore_ascii_case("data://")) {
        return "data://…".to_string();
    }
    match trimmed.find("://") {
        Some(i) => {
            let after = &trimmed[i + 3..];
            let host_end = after.find('/').unwrap_or(after.len());
            if host_end < after.len() {
                format!("{}{}/…", &trimmed[..i + 3], &after[..host_end])
            } else {
                trimmed.to_string()
            }
        }
        None => trimmed.chars().take(10).collect::<String>() + "…",
    }
}

/// Retrieves calendar text. Holds one HTTP client shared by all sources.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    /// # Errors
    /// Returns `IcalError::Http` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("camerge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the raw calendar text behind `location`.
    ///
    /// # Errors
    /// Returns `UnsupportedLocation`, `Http` (including non-success status
    /// codes) or `Io` depending on the location kind.
    pub fn fetch(&self, location: &str) -> Result<String> {
        match Location::parse(location)? {
            Location::Http(url) => {
                tracing::debug!(location = %redact(location), "fetching calendar over HTTP");
                // Private calendar URLs embed secret tokens; keep them out of error text.
                let text = self
                    .client
                    .get(url)
                    .send()
                    .and_then(|response| response.error_for_status())
                    .and_then(|response| response.text())
                    .map_err(|e| IcalError::Http(e.without_url()))?;
                Ok(text)
            }
            Location::File(path) => Ok(std::fs::read_to_string(path)?),
            Location::Data(text) => Ok(text.to_string()),
        }
    }

    /// Fetch and parse one source.
    ///
    /// The loaded source is identified by its full location. A failure is
    /// identified by the [`redact`]ed location, since it ends up in logs.
    pub fn load(
        &self,
        spec: &SourceSpec,
        options: &ParseOptions,
    ) -> std::result::Result<CalendarSource, SourceError> {
        let text = self
            .fetch(&spec.location)
            .map_err(|e| e.into_source_error(redact(&spec.location)))?;
        let events = parse_calendar(&text, options)
            .map_err(|e| e.into_source_error(redact(&spec.location)))?;
        tracing::debug!(
            location = %redact(&spec.location),
            events = events.len(),
            "loaded calendar source"
        );
        Ok(CalendarSource::new(spec.location.clone(), spec.anonymize, events))
    }

    /// Load every source concurrently, one thread per source.
    ///
    /// Results keep the order of `specs`; a failing source does not affect
    /// the others.
    pub fn load_all(
        &self,
        specs: &[SourceSpec],
        options: &ParseOptions,
    ) -> Vec<std::result::Result<CalendarSource, SourceError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = specs
                .iter()
                .map(|spec| (spec, scope.spawn(move || self.load(spec, options))))
                .collect();
            handles
                .into_iter()
                .map(|(spec, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(SourceError::Fetch {
                            source_id: redact(&spec.location),
                            message: "loader thread panicked".to_string(),
                        })
                    })
                })
                .collect()
        })
    }
}
