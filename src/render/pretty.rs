//! Single-line rendering of log records

use chrono::SecondsFormat;
use colored::*;
use eyre::{Context, Result};

use super::context::{Fields, unpack};
use crate::event::Event;
use crate::severity::{LEVEL_LABEL_WIDTH, Severity};

/// Message column width when context fields follow
const MESSAGE_WIDTH: usize = 44;

/// Formats log records for terminal display
#[derive(Debug, Clone, Copy)]
pub struct PrettyFormatter {
    pub threshold: Severity,
    pub multi_node: bool,
    pub color: bool,
}

impl PrettyFormatter {
    /// Format one event, or `None` when its severity is below the threshold
    pub fn format(&self, event: &Event) -> Result<Option<String>> {
        let record = event.to_log_record()?;
        let severity = Severity::from_record_level(&record.level).context("Failed to parse record level")?;

        if severity.is_below(self.threshold) {
            log::trace!("Suppressed {} record: {}", severity, record.message);
            return Ok(None);
        }

        let message = if event.is_logging() && self.multi_node {
            format!("[{}] {}", event.location, record.message)
        } else {
            record.message
        };

        let time = record.time.unwrap_or(event.timestamp);
        let fields = unpack(&record.context);

        Ok(Some(self.compose(
            &time.to_rfc3339_opts(SecondsFormat::Secs, true),
            severity,
            &message,
            &fields,
        )))
    }

    fn compose(&self, timestamp: &str, severity: Severity, message: &str, fields: &Fields) -> String {
        let label = format!("{:<width$}", severity.label(), width = LEVEL_LABEL_WIDTH);
        let label = if self.color {
            label.color(severity.color()).to_string()
        } else {
            label
        };

        let mut line = if fields.is_empty() {
            format!("{} {} {}", timestamp, label, message)
        } else {
            format!("{} {} {:<width$}", timestamp, label, message, width = MESSAGE_WIDTH)
        };

        for (key, value) in fields {
            let key = if self.color {
                key.color(severity.color()).to_string()
            } else {
                key.clone()
            };
            line.push(' ');
            line.push_str(&key);
            line.push('=');
            line.push_str(&quote_value(value));
        }

        line.push('\n');
        line
    }
}

/// Quote values outside the plain token set using Rust string escapes (`\"`, `\n`, `\t`).
/// Printable non-ASCII text is kept as is inside the quotes.
fn quote_value(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'));
    if plain { value.to_string() } else { format!("{:?}", value) }
}
