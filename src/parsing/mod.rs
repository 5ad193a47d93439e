//! The text-to-message pipeline, one stage per module.
//!
//! - [`normalize`]: decoding and invisible-character cleanup
//! - [`header`]: header grammars and line classification
//! - [`timestamp`]: date/time tokens to instants
//! - [`attachments`], [`links`], [`body`]: message body analysis
//! - [`media`]: attachment availability
//!
//! [`ChatParser`](crate::ChatParser) wires the stages together.

pub mod attachments;
pub mod body;
pub mod header;
pub mod links;
pub mod media;
pub mod normalize;
pub mod timestamp;

pub use body::{BodyAnalysis, BodyAnalyzer};
pub use header::{HeaderGrammar, LineClassifier, LineKind, MessageHeader, RegexGrammar};
pub use media::MediaIndex;
pub use normalize::{TextEncoding, normalize, normalize_text};
pub use timestamp::{ParsedTimestamp, TimestampNormalizer};
