//! Unified error types for chatlens.
//!
//! Every fatal condition of a parse call is a variant of [`ChatlensError`].
//! Per-line problems (an unrecognized line, an unparseable timestamp) are
//! never errors: the engine tolerates them and records them in
//! [`ParseStats`](crate::chat::ParseStats) instead.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging

use std::io;

use thiserror::Error;

use crate::chat::Degradation;
use crate::parsing::normalize::TextEncoding;

/// A specialized [`Result`] type for chatlens operations.
///
/// # Example
///
/// ```rust
/// use chatlens::error::Result;
/// use chatlens::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatlensError>;

/// The error type for all chatlens operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatlensError {
    /// An I/O error occurred while reading an export or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The transcript bytes are not valid text under the declared encoding.
    ///
    /// Fatal to the parse call; no partial result is produced.
    #[error("Transcript is not valid {encoding}: {detail}")]
    Decode {
        /// The encoding the bytes were decoded with
        encoding: TextEncoding,
        /// What the decoder rejected
        detail: String,
    },

    /// No archive entry looks like a chat transcript.
    #[error(
        "No chat transcript found: none of the {entries} archive entries is named like an exported chat"
    )]
    NoTranscriptFound {
        /// Number of non-directory entries that were inspected
        entries: usize,
    },

    /// A transcript entry was found but holds no bytes.
    #[error("Chat transcript '{name}' was found but is empty")]
    EmptyTranscript {
        /// Name of the matched archive entry
        name: String,
    },

    /// The parse finished but no line matched a message header.
    ///
    /// The engine itself returns an empty [`Chat`](crate::Chat) in this case;
    /// this variant exists for callers that surface it via
    /// [`Chat::require_participants`](crate::Chat::require_participants).
    #[error("No participants found: {0}")]
    NoParticipantsFound(Degradation),

    /// A configured pattern could not be compiled.
    #[error("Invalid {catalogue} pattern '{name}': {source}")]
    InvalidPattern {
        /// Which configuration catalogue the pattern came from
        catalogue: &'static str,
        /// Grammar name or the pattern text itself
        name: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A value does not match the expected structure (e.g. an unknown
    /// output extension or a grammar missing a required group).
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// What was being interpreted
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// JSON parsing/serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The export archive could not be read.
    #[cfg(feature = "archive")]
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatlensError {
    /// Creates a decode error.
    pub fn decode(encoding: TextEncoding, detail: impl Into<String>) -> Self {
        ChatlensError::Decode {
            encoding,
            detail: detail.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(
        catalogue: &'static str,
        name: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        ChatlensError::InvalidPattern {
            catalogue,
            name: name.into(),
            source,
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatlensError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatlensError::Io(_))
    }

    /// Returns `true` if the transcript could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, ChatlensError::Decode { .. })
    }

    /// Returns `true` if no transcript entry was identified.
    pub fn is_no_transcript(&self) -> bool {
        matches!(self, ChatlensError::NoTranscriptFound { .. })
    }

    /// Returns `true` if the transcript entry was empty.
    pub fn is_empty_transcript(&self) -> bool {
        matches!(self, ChatlensError::EmptyTranscript { .. })
    }

    /// Returns `true` if the parse yielded no participants.
    pub fn is_no_participants(&self) -> bool {
        matches!(self, ChatlensError::NoParticipantsFound(_))
    }

    /// Returns `true` if this is a configuration pattern error.
    pub fn is_invalid_pattern(&self) -> bool {
        matches!(self, ChatlensError::InvalidPattern { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatlensError::InvalidFormat { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatlensError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert!(err.is_io());
    }

    #[test]
    fn test_decode_display() {
        let err = ChatlensError::decode(TextEncoding::Utf8, "invalid byte at offset 3");
        let display = err.to_string();
        assert!(display.contains("UTF-8"));
        assert!(display.contains("offset 3"));
        assert!(err.is_decode());
        assert!(!err.is_io());
    }

    #[test]
    fn test_no_transcript_vs_empty_transcript() {
        let missing = ChatlensError::NoTranscriptFound { entries: 4 };
        let empty = ChatlensError::EmptyTranscript {
            name: "_chat.txt".into(),
        };

        assert!(missing.to_string().contains("4 archive entries"));
        assert!(empty.to_string().contains("'_chat.txt'"));
        assert!(empty.to_string().contains("empty"));

        assert!(missing.is_no_transcript());
        assert!(!missing.is_empty_transcript());
        assert!(empty.is_empty_transcript());
        assert!(!empty.is_no_transcript());
    }

    #[test]
    fn test_no_participants_display() {
        let err = ChatlensError::NoParticipantsFound(Degradation::EmptyInput);
        assert!(err.to_string().contains("nothing recognizable"));
        assert!(err.is_no_participants());

        let err = ChatlensError::NoParticipantsFound(Degradation::NoHeaders { content_lines: 7 });
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_invalid_pattern_has_source() {
        use std::error::Error;

        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err = ChatlensError::invalid_pattern("header grammar", "broken", regex_err);
        assert!(err.to_string().contains("header grammar"));
        assert!(err.to_string().contains("'broken'"));
        assert!(err.source().is_some());
        assert!(err.is_invalid_pattern());
    }

    #[test]
    fn test_invalid_format_display() {
        let err = ChatlensError::invalid_format("output", "unknown extension '.txt'");
        assert!(err.to_string().contains("Invalid output format"));
        assert!(err.is_invalid_format());
    }

    #[cfg(feature = "json-output")]
    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatlensError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_from_zip_error() {
        let err: ChatlensError = zip::result::ZipError::FileNotFound.into();
        assert!(err.to_string().contains("Archive error"));
    }

    #[test]
    fn test_error_debug() {
        let err = ChatlensError::EmptyTranscript { name: "x".into() };
        let debug = format!("{:?}", err);
        assert!(debug.contains("EmptyTranscript"));
    }
}
