//! Command-line interface definition using clap.
//!
//! [`Args`] is the argument structure of the `chatlens` binary. It lives in
//! the library so the mapping from flags to [`OutputConfig`] and log level can
//! be tested without spawning the binary.

use std::path::PathBuf;

use clap::Parser;

use crate::core::models::OutputConfig;
use crate::format::OutputFormat;

/// Default output path; its extension follows `--format`.
pub const DEFAULT_OUTPUT: &str = "parsed_chat.csv";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "CHATLENS_LOG";

/// Parse exported chat transcripts (a `.zip` export or a bare `.txt`)
/// into ordered message records.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatlens")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatlens \"WhatsApp Chat - Trip.zip\"
    chatlens _chat.txt -o trip.json -f json --segments
    chatlens export.zip -f jsonl -t --no-system
    chatlens export.zip --participants
    CHATLENS_LOG=debug chatlens export.zip")]
pub struct Args {
    /// Path to a `.zip` export or a transcript file
    pub input: PathBuf,

    /// Path to output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// JSON file overriding the parser catalogues
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include timestamps in output
    #[arg(short = 't', long)]
    pub timestamps: bool,

    /// Include the text/link segment breakdown
    #[arg(long)]
    pub segments: bool,

    /// Leave service notifications out of the output
    #[arg(long)]
    pub no_system: bool,

    /// Print the participant list
    #[arg(long)]
    pub participants: bool,

    /// Log debug events to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Output settings selected by the flags. Attachments are always written.
    pub fn output_config(&self) -> OutputConfig {
        let mut config = OutputConfig::new().with_attachments();
        if self.timestamps {
            config = config.with_timestamps();
        }
        if self.segments {
            config = config.with_segments();
        }
        if self.no_system {
            config = config.without_system();
        }
        config
    }

    /// Default log level when [`LOG_ENV`] is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }

    /// Output path, with the extension matching `--format` when the default
    /// path is used.
    pub fn output_path(&self) -> String {
        if self.output == DEFAULT_OUTPUT {
            format!("parsed_chat.{}", self.format.extension())
        } else {
            self.output.clone()
        }
    }
}
