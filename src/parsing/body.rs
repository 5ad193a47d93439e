//! Message body analysis.
//!
//! One assembled body goes through four fixed steps:
//!
//! 1. discard test (null markers, encryption notices)
//! 2. service-notification test
//! 3. attachment marker extraction
//! 4. link scanning on what remains
//!
//! The order matters: a notification sentence is never searched for
//! attachments or links, and attachment markers are gone before links are
//! looked for. [`BodyAnalyzer::emit`] then turns the analysis into zero or
//! more [`Message`]s.

use regex::{RegexSet, RegexSetBuilder};

use crate::config::ParserConfig;
use crate::error::{ChatlensError, Result};
use crate::message::{Attachment, Message, Segment};
use crate::parsing::attachments::AttachmentExtractor;
use crate::parsing::links::LinkScanner;
use crate::parsing::media::MediaIndex;
use crate::parsing::normalize::is_invisible_mark;
use crate::parsing::timestamp::ParsedTimestamp;

/// Outcome of analyzing one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyAnalysis {
    /// App boilerplate; nothing is emitted.
    Discard,
    /// A service notification with its trimmed text.
    System(String),
    /// User content.
    Content {
        /// Attachment-stripped, trimmed text
        remainder: String,
        /// `remainder` split into text and link runs
        segments: Vec<Segment>,
        /// Referenced file names in order of appearance
        attachments: Vec<String>,
    },
}

/// Compiled body catalogues.
#[derive(Debug, Clone)]
pub struct BodyAnalyzer {
    null_markers: Vec<String>,
    discard_phrases: Vec<String>,
    system: RegexSet,
    attachments: AttachmentExtractor,
    links: LinkScanner,
}

impl BodyAnalyzer {
    /// Compiles the body catalogues of `config`.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let system = RegexSetBuilder::new(&config.system_patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                let culprit = config
                    .system_patterns
                    .iter()
                    .find(|p| regex::Regex::new(p).is_err())
                    .cloned()
                    .unwrap_or_default();
                ChatlensError::invalid_pattern("system message", culprit, e)
            })?;

        Ok(Self {
            null_markers: lowercase_all(&config.null_markers),
            discard_phrases: lowercase_all(&config.discard_phrases),
            system,
            attachments: AttachmentExtractor::new(&config.attachment_extensions)?,
            links: LinkScanner::new(config.default_link_scheme.clone())?,
        })
    }

    /// Returns `true` if `body` is boilerplate that carries no user content.
    pub fn is_discarded(&self, body: &str) -> bool {
        let visible: String = body.chars().filter(|c| !is_invisible_mark(*c)).collect();
        let folded = visible.trim().to_lowercase();

        self.null_markers.iter().any(|marker| folded == *marker)
            || self
                .discard_phrases
                .iter()
                .any(|phrase| folded.contains(phrase.as_str()))
    }

    /// Returns `true` if the trimmed `body` is a service notification.
    pub fn is_system(&self, body: &str) -> bool {
        self.system.is_match(body.trim())
    }

    /// Runs the four analysis steps on one body.
    pub fn analyze(&self, body: &str) -> BodyAnalysis {
        if self.is_discarded(body) {
            return BodyAnalysis::Discard;
        }

        let trimmed = body.trim();
        if self.is_system(trimmed) {
            return BodyAnalysis::System(trimmed.to_string());
        }

        let extraction = self.attachments.extract(trimmed);
        let remainder = extraction.remainder.trim().to_string();
        let segments = self.links.segments(&remainder);

        BodyAnalysis::Content {
            remainder,
            segments,
            attachments: extraction.file_names,
        }
    }

    /// Analyzes the body of a notice header (one that names no sender).
    ///
    /// The exporter wrote the line itself, so anything not discarded is a
    /// service notification regardless of the system catalogue.
    pub fn analyze_notice(&self, body: &str) -> BodyAnalysis {
        let trimmed = body.trim();
        if trimmed.is_empty() || self.is_discarded(trimmed) {
            return BodyAnalysis::Discard;
        }
        BodyAnalysis::System(trimmed.to_string())
    }

    /// Turns an analysis into messages.
    ///
    /// A content body yields a text message when text remains after
    /// stripping, then one message per attachment in order. Attachment
    /// messages carry the remaining text as a single segment, if any.
    pub fn emit(
        &self,
        sender: &str,
        timestamp: ParsedTimestamp,
        analysis: BodyAnalysis,
        media: &MediaIndex,
    ) -> Vec<Message> {
        let ParsedTimestamp { instant, estimated } = timestamp;

        match analysis {
            BodyAnalysis::Discard => Vec::new(),
            BodyAnalysis::System(text) => {
                vec![Message::system(sender, instant, text).with_estimated_timestamp(estimated)]
            }
            BodyAnalysis::Content {
                remainder,
                segments,
                attachments,
            } => {
                let mut messages = Vec::with_capacity(attachments.len() + 1);

                // With no attachments the remainder is the whole cleaned body,
                // so this also covers a non-empty body without markers.
                if !remainder.is_empty() {
                    messages.push(
                        Message::text(sender, instant, remainder.as_str())
                            .with_segments(segments)
                            .with_estimated_timestamp(estimated),
                    );
                }

                for file_name in attachments {
                    let kind = media.resolve(&file_name);
                    let caption = if remainder.is_empty() {
                        Vec::new()
                    } else {
                        vec![Segment::text(remainder.as_str())]
                    };
                    messages.push(
                        Message::attachment(sender, instant, Attachment::new(file_name, kind))
                            .with_segments(caption)
                            .with_estimated_timestamp(estimated),
                    );
                }

                messages
            }
        }
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
