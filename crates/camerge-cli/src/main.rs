//! `camerge` CLI -- merge several iCalendar feeds into one availability
//! calendar.
//!
//! ## Usage
//!
//! ```sh
//! # Merge the sources listed in a config file, calendar on stdout
//! camerge merge --config camerge.toml
//!
//! # Ad-hoc: one public feed, one anonymized private feed, written to a file
//! camerge merge \
//!     --source webcal://p30-caldav.icloud.com/published/2/xxxx \
//!     --anonymize https://calendar.google.com/calendar/ical/me/private-xxxx/basic.ics \
//!     --email me@example.com --skip-before 2021-01-01 -o availability.ics
//!
//! # Check that every source can be fetched and parsed
//! camerge check --config camerge.toml --json
//! ```
//!
//! Logs go to stderr (`-v` for info, `-vv` for debug, or `RUST_LOG`), so
//! stdout carries nothing but the calendar.

mod config;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use camerge_engine::{merge_partial, SourceError};
use camerge_ical::fetch::redact;
use camerge_ical::{encode, Fetcher};
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(
    name = "camerge",
    version,
    about = "Merge iCalendar feeds into one availability calendar"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every source, merge and write the calendar
    Merge {
        #[command(flatten)]
        sources: SourceArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch and parse every source, then report which ones work
    Check {
        #[command(flatten)]
        sources: SourceArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Add a source whose event summaries are kept (repeatable)
    #[arg(long = "source", value_name = "LOCATION")]
    sources: Vec<String>,
    /// Add a source whose event summaries are replaced (repeatable)
    #[arg(long = "anonymize", value_name = "LOCATION")]
    anonymized: Vec<String>,
    /// Add one of your own email addresses (repeatable)
    #[arg(long = "email", value_name = "ADDRESS")]
    emails: Vec<String>,
    /// Calendar display name
    #[arg(long)]
    name: Option<String>,
    /// Domain used for the product id and event UIDs
    #[arg(long)]
    domain: Option<String>,
    /// IANA timezone for all-day and floating times (e.g. Europe/Prague)
    #[arg(long)]
    timezone: Option<String>,
    /// Drop events that ended before this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    skip_before: Option<NaiveDate>,
    /// Summary shown for events of anonymized sources
    #[arg(long)]
    placeholder: Option<String>,
}

impl SourceArgs {
    fn load_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply(Overrides {
            sources: self.sources,
            anonymized_sources: self.anonymized,
            emails: self.emails,
            name: self.name,
            domain: self.domain,
            timezone: self.timezone,
            skip_before: self.skip_before,
            placeholder: self.placeholder,
        });
        Ok(config)
    }
}

/// One line of the `check` report.
#[derive(Debug, Serialize)]
struct SourceReport {
    location: String,
    anonymize: bool,
    ok: bool,
    events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Merge { sources, output } => {
            let config = sources.load_config()?;
            run_merge(&config, output.as_deref())?;
        }
        Commands::Check { sources, json } => {
            let config = sources.load_config()?;
            let reports = run_check(&config)?;
            print_reports(&reports, json)?;
            if reports.iter().any(|r| !r.ok) {
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_merge(config: &Config, output: Option<&std::path::Path>) -> Result<()> {
    let options = config.merge_options()?;
    let now = Utc::now();
    let parse_options = config.parse_options(now)?;
    let fetcher = Fetcher::new(config.timeout()).context("Failed to build HTTP client")?;

    let specs = config.source_specs();
    tracing::info!(sources = specs.len(), timezone = %options.timezone, "loading calendar sources");
    let loaded = fetcher.load_all(&specs, &parse_options);
    let outcome = merge_partial(&options, loaded).context("Failed to merge calendars")?;

    if outcome.is_partial() {
        let skipped: Vec<&str> = outcome.failures.iter().map(SourceError::source_id).collect();
        eprintln!(
            "camerge: skipped {} of {} sources: {}",
            skipped.len(),
            specs.len(),
            skipped.join(", ")
        );
    }

    let text = encode(&outcome.calendar, now);
    write_output(output, &text)
}

fn run_check(config: &Config) -> Result<Vec<SourceReport>> {
    let parse_options = config.parse_options(Utc::now())?;
    let fetcher = Fetcher::new(config.timeout()).context("Failed to build HTTP client")?;
    let specs = config.source_specs();
    if specs.is_empty() {
        anyhow::bail!("No calendar sources configured. Add [[sources]] to the config or pass --source/--anonymize.");
    }

    let reports = specs
        .iter()
        .zip(fetcher.load_all(&specs, &parse_options))
        .map(|(spec, result)| {
            let (events, error) = match result {
                Ok(source) => (source.events.len(), None),
                Err(err) => (0, Some(failure_message(&err))),
            };
            SourceReport {
                location: redact(&spec.location),
                anonymize: spec.anonymize,
                ok: error.is_none(),
                events,
                error,
            }
        })
        .collect();
    Ok(reports)
}

/// The failure without the source location, which may embed a secret token.
fn failure_message(err: &SourceError) -> String {
    match err {
        SourceError::Fetch { message, .. } => format!("fetch failed: {}", message),
        SourceError::Parse { message, .. } => format!("parse failed: {}", message),
    }
}

fn print_reports(reports: &[SourceReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    for report in reports {
        match &report.error {
            None => println!("ok      {}  ({} events)", report.location, report.events),
            Some(error) => println!("FAILED  {}  {}", report.location, error),
        }
    }
    Ok(())
}

fn write_output(path: Option<&std::path::Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
