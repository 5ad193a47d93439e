//! # Chatlens
//!
//! A Rust library for turning exported chat transcripts (WhatsApp-style
//! `.txt` exports and the `.zip` bundles that carry them with their media)
//! into ordered, display-ready message records.
//!
//! ## Overview
//!
//! Exported transcripts are semi-structured: every message starts with a
//! header line (`[15.03.2023, 14:05:12] Ana: …` or `3/9/23, 2:05 PM - Ben: …`),
//! bodies can span many lines, and the text is sprinkled with invisible
//! direction marks, attachment markers, links, and service notifications.
//! Chatlens handles all of it with a single linear scan that never aborts on a
//! bad line:
//!
//! - header lines are recognized by a priority-ordered list of grammars
//! - date/time tokens in many locales are normalized to UTC instants
//! - attachment markers become [`Attachment`](message::Attachment)s with a resolved kind
//! - URLs are split out as link [`Segment`](message::Segment)s
//! - notifications are flagged as system messages, boilerplate is dropped
//!
//! ## Quick Start
//!
//! ```rust
//! use chatlens::prelude::*;
//!
//! let parser = ChatParser::new();
//! let chat = parser.parse_str(
//!     "[01.01.2024, 09:00:00] Cleo: Visit http://example.com/path now\n\
//!      [01.01.2024, 09:01:00] Dax: Dax added Eve",
//! );
//!
//! assert_eq!(chat.messages().len(), 2);
//! assert_eq!(chat.messages()[0].links().collect::<Vec<_>>(), ["http://example.com/path"]);
//! assert!(chat.messages()[1].is_system_message);
//! ```
//!
//! ## Archives
//!
//! ```rust,no_run
//! # #[cfg(feature = "archive")]
//! # fn main() -> chatlens::Result<()> {
//! use chatlens::prelude::*;
//!
//! let chat = ChatParser::new()
//!     .parse_path("WhatsApp Chat - Trip.zip".as_ref())?
//!     .require_participants()?;
//!
//! for msg in chat.messages() {
//!     println!("{}: {}", msg.sender, msg.preview(40));
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "archive"))]
//! # fn main() {}
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - [`ChatParser`], the entry point and chat assembler
//! - [`parsing`] - pipeline stages (normalization, headers, timestamps, bodies, media)
//! - [`config`] - [`ParserConfig`](config::ParserConfig), the swappable pattern catalogues
//! - [`archive`] - [`ArchiveEntries`](archive::ArchiveEntries) and transcript lookup
//! - [`chat`] / [`message`] - the parse result types
//! - [`core`] / [`format`] - CSV, JSON and JSONL writers
//! - [`error`] - [`ChatlensError`], [`Result`]
//! - [`prelude`] - Convenient re-exports

pub mod archive;
pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod message;
pub mod parser;
pub mod parsing;

// Re-export the main types at the crate root for convenience
pub use chat::Chat;
pub use error::{ChatlensError, Result};
pub use message::Message;
pub use parser::ChatParser;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatlens::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Chat, ChatParser, Message};

    pub use crate::error::{ChatlensError, Result};

    pub use crate::archive::ArchiveEntries;
    pub use crate::chat::{Degradation, ParseStats};
    pub use crate::config::{FallbackTimestamp, GrammarSpec, ParserConfig};
    pub use crate::message::{Attachment, AttachmentKind, Segment};
    pub use crate::parsing::{HeaderGrammar, MediaIndex, MessageHeader, TextEncoding};

    pub use crate::core::models::OutputConfig;
    pub use crate::format::{OutputFormat, to_format_string, write_to_format};
}
