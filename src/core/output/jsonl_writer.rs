//! JSON Lines (JSONL) output writer.
//!
//! One message per line, same fields as the JSON writer. Suited to
//! line-oriented tools and ingestion pipelines.

use std::fs::File;
use std::io::{BufWriter, Write};

use super::json_writer::JsonMessage;
use crate::Message;
use crate::core::models::OutputConfig;
use crate::error::Result;

/// Writes messages to JSONL (JSON Lines) format.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"sender":"Alice","content":"Hello"}
/// {"sender":"Bob","content":"Hi"}
/// ```
pub fn write_jsonl(messages: &[Message], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_lines(messages, &mut writer, config)?;
    writer.flush()?;
    Ok(())
}

/// Converts messages to a JSONL string.
pub fn to_jsonl(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut out = String::new();
    for msg in messages.iter().filter(|m| config.selects(m)) {
        out.push_str(&serde_json::to_string(&JsonMessage::from_message(msg, config))?);
        out.push('\n');
    }
    Ok(out)
}

fn write_lines<W: Write>(messages: &[Message], writer: &mut W, config: &OutputConfig) -> Result<()> {
    for msg in messages.iter().filter(|m| config.selects(m)) {
        let line = serde_json::to_string(&JsonMessage::from_message(msg, config))?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
