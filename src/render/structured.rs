//! JSON and YAML rendering of whole events

use eyre::{Context, Result};
use serde_json::Value;

use crate::event::Event;
use crate::options::OutputFormat;

/// Round-trip an event through JSON so nested payloads become plain trees
pub fn to_generic(event: &Event) -> Result<Value> {
    let encoded = serde_json::to_vec(event).context("Failed to encode event")?;
    serde_json::from_slice(&encoded).context("Failed to decode event")
}

/// Encode a generic tree in the requested format, without a trailing newline
pub fn encode(tree: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(tree).context("Failed to render event as json"),
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(tree).context("Failed to render event as yaml")?;
            Ok(yaml.trim_end_matches('\n').to_string())
        }
        OutputFormat::Pretty => eyre::bail!("pretty output is not a structured format"),
    }
}
