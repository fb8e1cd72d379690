//! Event rendering
//!
//! Turns each delivered event into output according to the configured format:
//! - pretty: one log line per `logging` event, filtered by severity
//! - json/yaml: the whole event, followed by a blank separator line

pub mod context;
pub mod pretty;
pub mod structured;

use eyre::{Context, Result};
use std::io::Write;

use crate::event::Event;
use crate::options::{OutputFormat, RenderConfig};
use pretty::PrettyFormatter;

/// Writes rendered events to an output sink
pub struct Renderer<W: Write> {
    format: OutputFormat,
    pretty: PrettyFormatter,
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(config: &RenderConfig, multi_node: bool, out: W) -> Self {
        Self {
            format: config.format,
            pretty: PrettyFormatter {
                threshold: config.effective_threshold(),
                multi_node,
                color: false,
            },
            out,
        }
    }

    /// Colour level labels in pretty output
    pub fn with_color(mut self, color: bool) -> Self {
        self.pretty.color = color;
        self
    }

    /// Render a single event. Any error is fatal to the session.
    pub fn render(&mut self, event: &Event) -> Result<()> {
        let text = match self.format {
            OutputFormat::Pretty => match self.pretty.format(event)? {
                Some(line) => line,
                None => return Ok(()),
            },
            format => {
                let tree = structured::to_generic(event)?;
                format!("{}\n\n", structured::encode(&tree, format)?)
            }
        };

        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .context("Failed to write event")
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
