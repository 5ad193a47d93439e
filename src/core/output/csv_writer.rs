//! CSV output writer.

use std::fs::File;
use std::io::Write;

use crate::Message;
use crate::core::models::OutputConfig;
use crate::error::Result;

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: Depends on OutputConfig
///   - Basic: `Sender`, `Content`
///   - With timestamps: `Timestamp`, `Sender`, `Content`
///   - With attachments: `…`, `Attachment`, `Kind`
///   - With segments: `…`, `Links` (space separated URLs)
/// - System messages carry a `System` column when they are not skipped
/// - Encoding: UTF-8
pub fn write_csv(messages: &[Message], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(messages, file, config)
}

/// Converts messages to a CSV string.
pub fn to_csv(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut buf = Vec::new();
    write_records(messages, &mut buf, config)?;
    String::from_utf8(buf).map_err(|e| {
        crate::ChatlensError::invalid_format("csv", format!("writer produced invalid UTF-8: {e}"))
    })
}

fn write_records<W: Write>(messages: &[Message], out: W, config: &OutputConfig) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);

    // Build header dynamically
    writer.write_record(build_header(config))?;

    for msg in messages.iter().filter(|m| config.selects(m)) {
        writer.write_record(build_record(msg, config))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV header based on output configuration.
fn build_header(config: &OutputConfig) -> Vec<&'static str> {
    let mut header = Vec::new();

    if config.include_timestamps {
        header.push("Timestamp");
    }

    header.push("Sender");
    header.push("Content");

    if config.include_attachments {
        header.push("Attachment");
        header.push("Kind");
    }
    if config.include_segments {
        header.push("Links");
    }
    if !config.skip_system {
        header.push("System");
    }

    header
}

/// Build CSV record for a single message.
fn build_record(msg: &Message, config: &OutputConfig) -> Vec<String> {
    let mut record = Vec::new();

    if config.include_timestamps {
        record.push(msg.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
    }

    record.push(msg.sender.clone());
    record.push(msg.plain_text());

    if config.include_attachments {
        let first = msg.attachments.first();
        record.push(first.map(|a| a.file_name.clone()).unwrap_or_default());
        record.push(first.map(|a| a.kind.to_string()).unwrap_or_default());
    }
    if config.include_segments {
        record.push(msg.links().collect::<Vec<_>>().join(" "));
    }
    if !config.skip_system {
        record.push(if msg.is_system_message { "yes" } else { "" }.to_string());
    }

    record
}
