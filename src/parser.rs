//! Chat assembly: from normalized lines to an ordered [`Chat`].
//!
//! [`ChatParser`] compiles a [`ParserConfig`] once and can then parse any
//! number of transcripts. Each call is a single linear scan driven by a small
//! state machine:
//!
//! - a header line finalizes the message under construction (if any) and
//!   starts a new one
//! - any other line is appended to the message under construction, or
//!   dropped when there is none
//! - end of input finalizes the last message
//!
//! Finalized messages are stably sorted by timestamp, so messages sharing an
//! instant keep their file order.
//!
//! # Example
//!
//! ```rust
//! use chatlens::ChatParser;
//!
//! let parser = ChatParser::new();
//! let chat = parser.parse_str(
//!     "[15.03.2023, 14:05:12] Ana: Hello there\n\
//!      how are you?\n\
//!      [15.03.2023, 14:06:00] Ben: fine, see www.example.com",
//! );
//!
//! assert_eq!(chat.messages().len(), 2);
//! assert_eq!(chat.messages()[0].raw_body, "Hello there\nhow are you?");
//! assert_eq!(chat.participants().len(), 2);
//! ```
//!
//! A parser is immutable after construction; share it freely across threads
//! to parse several chats in parallel.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::archive::ArchiveEntries;
use crate::chat::{Chat, ParseStats};
use crate::config::ParserConfig;
use crate::error::Result;
use crate::message::Message;
use crate::parsing::body::{BodyAnalysis, BodyAnalyzer};
use crate::parsing::header::{HeaderGrammar, LineClassifier, LineKind, MessageHeader};
use crate::parsing::media::MediaIndex;
use crate::parsing::normalize::{self, TextEncoding};
use crate::parsing::timestamp::{ParsedTimestamp, TimestampNormalizer};

/// Compiled transcript parser.
#[derive(Debug)]
pub struct ChatParser {
    config: ParserConfig,
    classifier: LineClassifier,
    timestamps: TimestampNormalizer,
    bodies: BodyAnalyzer,
}

impl ChatParser {
    /// Creates a parser with the built-in catalogues.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in patterns are covered by tests. Use
    /// [`with_config`](Self::with_config) for user-supplied catalogues.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
            .expect("built-in parser catalogues must compile")
    }

    /// Creates a parser from a configuration, compiling every catalogue.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::InvalidPattern`](crate::ChatlensError::InvalidPattern)
    /// or [`ChatlensError::InvalidFormat`](crate::ChatlensError::InvalidFormat)
    /// if a pattern does not compile or a grammar lacks a required group.
    pub fn with_config(config: ParserConfig) -> Result<Self> {
        let classifier = LineClassifier::from_specs(&config.header_grammars)?;
        let timestamps =
            TimestampNormalizer::new(config.date_layouts.clone(), config.fallback_timestamp);
        let bodies = BodyAnalyzer::new(&config)?;

        Ok(Self {
            config,
            classifier,
            timestamps,
            bodies,
        })
    }

    /// Builder method to append a custom header grammar with the lowest priority.
    #[must_use]
    pub fn with_grammar(mut self, grammar: impl HeaderGrammar + 'static) -> Self {
        self.classifier.push(grammar);
        self
    }

    /// Returns the configuration the parser was built from.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns the line classifier.
    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parses transcript text with no media available.
    ///
    /// The text is normalized first. Attachments resolve to
    /// [`AttachmentKind::Missing`](crate::message::AttachmentKind::Missing).
    pub fn parse_str(&self, text: &str) -> Chat {
        self.parse_with_media(text, &MediaIndex::empty())
    }

    /// Parses transcript text, resolving attachments against `media`.
    pub fn parse_with_media(&self, text: &str, media: &MediaIndex) -> Chat {
        let normalized = normalize::normalize_text(text);
        self.assemble(&normalized, media)
    }

    /// Decodes and parses raw transcript bytes.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::Decode`](crate::ChatlensError::Decode) if the bytes are
    /// not valid under `encoding`.
    pub fn parse_bytes(
        &self,
        raw: &[u8],
        encoding: TextEncoding,
        media: &MediaIndex,
    ) -> Result<Chat> {
        let normalized = normalize::normalize(raw, encoding)?;
        Ok(self.assemble(&normalized, media))
    }

    /// Locates the transcript inside an export and parses it against the
    /// remaining entries. The transcript encoding is sniffed from its BOM.
    ///
    /// # Errors
    ///
    /// Transcript lookup errors from
    /// [`ArchiveEntries::find_transcript`] and decode errors.
    pub fn parse_archive(&self, entries: &ArchiveEntries) -> Result<Chat> {
        let (name, raw) = entries.find_transcript(&self.config)?;
        let media = entries.media_index(name);
        tracing::debug!(transcript = name, media = media.len(), "parsing archive");
        self.parse_bytes(raw, TextEncoding::sniff(raw), &media)
    }

    /// Parses an export from disk: a `.zip` archive, or a bare transcript
    /// file with no media.
    ///
    /// # Errors
    ///
    /// I/O errors, archive errors, and everything [`parse_archive`](Self::parse_archive)
    /// and [`parse_bytes`](Self::parse_bytes) return.
    pub fn parse_path(&self, path: &Path) -> Result<Chat> {
        let bytes = std::fs::read(path)?;

        #[cfg(feature = "archive")]
        if is_zip(path) {
            let entries = crate::archive::read_zip(&bytes)?;
            return self.parse_archive(&entries);
        }

        self.parse_bytes(&bytes, TextEncoding::sniff(&bytes), &MediaIndex::empty())
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    fn assemble(&self, text: &str, media: &MediaIndex) -> Chat {
        let parse_start = self.timestamps.fallback_instant(Utc::now());
        let mut assembler = Assembler::new(self, media, parse_start);

        for (index, line) in text.lines().enumerate() {
            assembler.feed(index + 1, line);
        }

        assembler.finish()
    }
}

impl Default for ChatParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "archive")]
fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// A message whose body is still growing.
#[derive(Debug)]
struct PendingMessage {
    sender: String,
    notice: bool,
    timestamp: ParsedTimestamp,
    body: String,
}

#[derive(Debug)]
enum ScanState {
    Idle,
    Accumulating(PendingMessage),
}

/// One scan over one transcript.
struct Assembler<'p> {
    parser: &'p ChatParser,
    media: &'p MediaIndex,
    fallback: DateTime<Utc>,
    state: ScanState,
    messages: Vec<Message>,
    participants: BTreeSet<String>,
    stats: ParseStats,
}

impl<'p> Assembler<'p> {
    fn new(parser: &'p ChatParser, media: &'p MediaIndex, fallback: DateTime<Utc>) -> Self {
        Self {
            parser,
            media,
            fallback,
            state: ScanState::Idle,
            messages: Vec::new(),
            participants: BTreeSet::new(),
            stats: ParseStats::default(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) {
        self.stats.lines += 1;

        match self.parser.classifier.classify(line) {
            LineKind::Header(header) => {
                self.stats.header_lines += 1;
                self.finalize();
                let pending = self.start(line_no, header);
                self.state = ScanState::Accumulating(pending);
            }
            LineKind::Continuation => {
                let blank = line.trim().is_empty();
                match &mut self.state {
                    ScanState::Accumulating(pending) => {
                        pending.body.push('\n');
                        pending.body.push_str(line);
                        if !blank {
                            self.stats.continuation_lines += 1;
                        }
                    }
                    ScanState::Idle if !blank => {
                        self.stats.dropped_lines += 1;
                        tracing::debug!(line = line_no, "dropping line outside any message");
                    }
                    ScanState::Idle => {}
                }
            }
        }
    }

    fn start(&mut self, line_no: usize, header: MessageHeader<'_>) -> PendingMessage {
        let timestamp =
            self.parser
                .timestamps
                .to_instant(header.date, header.time, self.fallback);

        if timestamp.estimated {
            self.stats.fallback_timestamps += 1;
            tracing::warn!(
                line = line_no,
                date = header.date,
                time = header.time,
                "unrecognized timestamp, using fallback"
            );
        }

        PendingMessage {
            sender: header.sender.to_string(),
            notice: header.is_notice(),
            timestamp,
            body: header.remainder.to_string(),
        }
    }

    fn finalize(&mut self) {
        let ScanState::Accumulating(pending) = std::mem::replace(&mut self.state, ScanState::Idle)
        else {
            return;
        };

        let bodies = &self.parser.bodies;
        let analysis = if pending.notice {
            bodies.analyze_notice(&pending.body)
        } else {
            bodies.analyze(&pending.body)
        };
        match &analysis {
            BodyAnalysis::Discard => {
                self.stats.discarded_bodies += 1;
                tracing::debug!(sender = %pending.sender, "discarding boilerplate body");
            }
            BodyAnalysis::System(_) => self.stats.system_messages += 1,
            BodyAnalysis::Content { .. } => {}
        }

        self.messages.extend(bodies.emit(
            &pending.sender,
            pending.timestamp,
            analysis,
            self.media,
        ));
        if !pending.notice {
            self.participants.insert(pending.sender);
        }
    }

    fn finish(mut self) -> Chat {
        self.finalize();
        self.messages.sort_by_key(|m| m.timestamp);

        tracing::debug!(
            messages = self.messages.len(),
            participants = self.participants.len(),
            lines = self.stats.lines,
            dropped = self.stats.dropped_lines,
            fallbacks = self.stats.fallback_timestamps,
            "parsed chat"
        );

        Chat {
            messages: self.messages,
            participants: self.participants,
            stats: self.stats,
        }
    }
}
