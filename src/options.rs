//! Render configuration and option validation
//!
//! Raw command-line values are checked and normalized here, before any feed is opened.

use eyre::{Context, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::severity::Severity;

/// Output format for rendered events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON, one document per event
    Json,
    /// Single-line human readable log records
    Pretty,
    /// Block YAML, one document per event
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "yaml" => Ok(Self::Yaml),
            _ => Err(eyre::eyre!("Invalid format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Option values as the user supplied them
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub format: String,
    pub pretty: bool,
    pub loglevel: Option<String>,
    pub types: Vec<String>,
    pub all_projects: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            format: "yaml".to_string(),
            pretty: false,
            loglevel: None,
            types: Vec::new(),
            all_projects: false,
        }
    }
}

/// Validated, read-only rendering configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub format: OutputFormat,
    /// Only set for the pretty format
    pub log_level_threshold: Option<Severity>,
    /// Event types to subscribe to; empty means all
    pub type_filter: BTreeSet<String>,
    pub all_projects: bool,
}

impl RenderConfig {
    pub fn from_options(options: MonitorOptions) -> Result<Self> {
        let mut format: OutputFormat = options.format.parse()?;

        if options.pretty {
            format = OutputFormat::Pretty;
        }

        let loglevel = options.loglevel.as_deref().filter(|level| !level.is_empty());

        if format != OutputFormat::Pretty && loglevel.is_some() {
            eyre::bail!("Log level filtering can only be used with pretty formatting");
        }

        let log_level_threshold = loglevel
            .map(|level| level.parse::<Severity>())
            .transpose()
            .context("Invalid --loglevel")?;

        let type_filter = options.types.into_iter().filter(|t| !t.is_empty()).collect();

        Ok(Self {
            format,
            log_level_threshold,
            type_filter,
            all_projects: options.all_projects,
        })
    }

    /// Records less urgent than this are suppressed in pretty output
    pub fn effective_threshold(&self) -> Severity {
        self.log_level_threshold.unwrap_or(Severity::Debug)
    }
}
