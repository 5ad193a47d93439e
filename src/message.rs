//! Display-ready message records.
//!
//! This module provides [`Message`], the finalized record the engine emits for
//! each conversational turn, and its parts:
//!
//! - [`Segment`]: a run of plain text or a hyperlink, in reading order
//! - [`Attachment`]: a media file referenced by the message
//! - [`AttachmentKind`]: what the referenced file is, or that it is missing
//!
//! # Examples
//!
//! ```
//! use chatlens::message::{Message, Segment};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let msg = Message::text("Cleo", ts, "Hello")
//!     .with_segments(vec![Segment::text("Hello")]);
//!
//! assert_eq!(msg.sender(), "Cleo");
//! assert_eq!(msg.plain_text(), "Hello");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// One run of a message body, in left-to-right reading order.
///
/// Concatenating [`Segment::content`] over all segments of a message yields
/// the attachment-stripped, trimmed body text exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Plain text.
    Text {
        /// The text as it appeared in the body
        content: String,
    },
    /// A detected URL.
    Link {
        /// The URL as it appeared in the body
        content: String,
        /// Absolute URL to open (scheme added when the body had none)
        url: String,
    },
}

impl Segment {
    /// Creates a plain text segment.
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    /// Creates a link segment.
    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        Segment::Link {
            content: content.into(),
            url: url.into(),
        }
    }

    /// Returns the text this segment covers in the body.
    pub fn content(&self) -> &str {
        match self {
            Segment::Text { content } | Segment::Link { content, .. } => content,
        }
    }

    /// Returns the link target, if this is a link.
    pub fn url(&self) -> Option<&str> {
        match self {
            Segment::Link { url, .. } => Some(url),
            Segment::Text { .. } => None,
        }
    }

    /// Returns `true` for link segments.
    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link { .. })
    }
}

/// Classification of a referenced media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Photos and stickers
    Image,
    /// Video clips and GIF conversions
    Video,
    /// Voice notes and audio files
    Audio,
    /// PDFs, office documents, plain text files
    Document,
    /// Present in the archive but of no known media type (contacts, archives, ...)
    Other,
    /// Referenced by the transcript but absent from the archive
    Missing,
}

impl AttachmentKind {
    /// Classifies a file name by its extension, ignoring case.
    ///
    /// Never returns [`Missing`](AttachmentKind::Missing); availability is
    /// decided by the media resolver.
    ///
    /// ```
    /// use chatlens::message::AttachmentKind;
    ///
    /// assert_eq!(AttachmentKind::from_file_name("IMG-0001.JPG"), AttachmentKind::Image);
    /// assert_eq!(AttachmentKind::from_file_name("PTT-0001.opus"), AttachmentKind::Audio);
    /// assert_eq!(AttachmentKind::from_file_name("contact.vcf"), AttachmentKind::Other);
    /// ```
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" | "bmp" => AttachmentKind::Image,
            "mp4" | "mov" | "3gp" | "avi" | "mkv" | "webm" | "m4v" => AttachmentKind::Video,
            "opus" | "ogg" | "mp3" | "m4a" | "aac" | "wav" | "amr" => AttachmentKind::Audio,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "csv" | "rtf"
            | "odt" => AttachmentKind::Document,
            _ => AttachmentKind::Other,
        }
    }

    /// Returns `true` unless the file is missing from the archive.
    pub fn is_available(self) -> bool {
        self != AttachmentKind::Missing
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::Audio => "audio",
            AttachmentKind::Document => "document",
            AttachmentKind::Other => "other",
            AttachmentKind::Missing => "missing",
        };
        f.write_str(name)
    }
}

/// A media file referenced from a message body.
///
/// The engine only classifies the file; callers resolve `file_name` against
/// the archive to fetch bytes for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name exactly as written in the transcript
    pub file_name: String,
    /// Media kind, or [`AttachmentKind::Missing`]
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Creates an attachment reference.
    pub fn new(file_name: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
        }
    }
}

/// A finalized, display-ready chat message.
///
/// Produced by [`ChatParser`](crate::ChatParser); immutable once the parse
/// returns. A single transcript entry can yield several messages: one for
/// its text and one per attachment, all sharing sender and timestamp.
///
/// # Invariants
///
/// - A system message has exactly one [`Segment::Text`] equal to `raw_body`
///   and no attachments.
/// - `segments` is never absent; a pure attachment message has it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the author as written in the header line.
    pub sender: String,

    /// When the message was sent (interpreted as UTC, exports carry no zone).
    pub timestamp: DateTime<Utc>,

    /// `true` when the header's date/time matched no known layout and
    /// `timestamp` holds the configured fallback instead.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timestamp_estimated: bool,

    /// Attachment-stripped, trimmed body text. Empty for attachment messages.
    pub raw_body: String,

    /// Body decomposed into text and link runs.
    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Referenced media files, usually zero or one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// `true` for service notifications (member added, subject changed, ...).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system_message: bool,
}

impl Message {
    /// Creates a user text message with no segments yet.
    pub fn text(
        sender: impl Into<String>,
        timestamp: DateTime<Utc>,
        raw_body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            timestamp_estimated: false,
            raw_body: raw_body.into(),
            segments: Vec::new(),
            attachments: Vec::new(),
            is_system_message: false,
        }
    }

    /// Creates a service notification; the whole body becomes one text segment.
    pub fn system(
        sender: impl Into<String>,
        timestamp: DateTime<Utc>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            sender: sender.into(),
            timestamp,
            timestamp_estimated: false,
            segments: vec![Segment::text(body.clone())],
            raw_body: body,
            attachments: Vec::new(),
            is_system_message: true,
        }
    }

    /// Creates a message carrying one attachment and an empty body.
    pub fn attachment(
        sender: impl Into<String>,
        timestamp: DateTime<Utc>,
        attachment: Attachment,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            timestamp_estimated: false,
            raw_body: String::new(),
            segments: Vec::new(),
            attachments: vec![attachment],
            is_system_message: false,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the segments.
    #[must_use]
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Builder method to flag the timestamp as a fallback value.
    #[must_use]
    pub fn with_estimated_timestamp(mut self, estimated: bool) -> Self {
        self.timestamp_estimated = estimated;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the segments in reading order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the attachments in order of appearance.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    // =========================================================================
    // Utility methods
    // =========================================================================

    /// Concatenates segment contents, ignoring the link/text distinction.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(Segment::content).collect()
    }

    /// Returns the links of this message in order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::url)
    }

    /// Returns `true` if this message references at least one media file.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Returns the first `max_graphemes` user-perceived characters of the
    /// text, followed by `…` when truncated.
    ///
    /// Emoji sequences and combining marks are never split.
    ///
    /// ```
    /// use chatlens::message::{Message, Segment};
    /// use chrono::Utc;
    ///
    /// let msg = Message::text("Ana", Utc::now(), "👨‍👩‍👧 family")
    ///     .with_segments(vec![Segment::text("👨‍👩‍👧 family")]);
    /// assert_eq!(msg.preview(2), "👨‍👩‍👧 …");
    /// ```
    pub fn preview(&self, max_graphemes: usize) -> String {
        let text = self.plain_text();
        let mut graphemes = text.graphemes(true);
        let mut preview: String = graphemes.by_ref().take(max_graphemes).collect();
        if graphemes.next().is_some() {
            preview.push('…');
        }
        preview
    }
}
