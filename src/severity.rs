//! Log record severity
//!
//! Severities are ordered by urgency: `Trace` is the least urgent, `Panic` the most.
//! Comparisons use declaration order, never the token text.

use colored::Color;
use eyre::Result;
use std::fmt;
use std::str::FromStr;

/// Width of the longest level label (`WARNING`), used to align pretty output
pub const LEVEL_LABEL_WIDTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl Severity {
    /// Parse a record level, accepting the `dbug` alias used by some emitters
    pub fn from_record_level(level: &str) -> Result<Self> {
        if level.eq_ignore_ascii_case("dbug") {
            return Ok(Self::Debug);
        }
        level.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
        }
    }

    /// Upper-case label for pretty output
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Terminal colour for the level label
    pub fn color(&self) -> Color {
        match self {
            Self::Trace | Self::Debug => Color::White,
            Self::Info => Color::Cyan,
            Self::Warning => Color::Yellow,
            Self::Error | Self::Fatal | Self::Panic => Color::Red,
        }
    }

    /// True when a record at this severity falls below `threshold` and should be hidden
    pub fn is_below(&self, threshold: Severity) -> bool {
        *self < threshold
    }
}

impl FromStr for Severity {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "panic" => Ok(Self::Panic),
            _ => Err(eyre::eyre!("not a valid log level: {:?}", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
