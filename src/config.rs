//! Parser configuration.
//!
//! Every catalogue the engine matches against is data held in
//! [`ParserConfig`], never literals inside the matching code:
//!
//! - [`header_grammars`](ParserConfig::header_grammars): ordered line grammars
//! - [`date_layouts`](ParserConfig::date_layouts): ordered chrono layouts
//! - [`attachment_extensions`](ParserConfig::attachment_extensions): allow-list
//! - [`system_patterns`](ParserConfig::system_patterns): service notifications
//! - [`null_markers`](ParserConfig::null_markers) and
//!   [`discard_phrases`](ParserConfig::discard_phrases): boilerplate to drop
//!
//! The defaults describe WhatsApp exports from both the iOS (`[date, time]
//! Sender: text`) and Android (`date, time - Sender: text`) apps.
//!
//! # Example
//!
//! ```rust
//! use chatlens::config::{GrammarSpec, ParserConfig};
//! use chatlens::ChatParser;
//!
//! let config = ParserConfig::new()
//!     .with_grammar(GrammarSpec::new(
//!         "iso",
//!         r"^(?P<date>\d{4}-\d{2}-\d{2}) (?P<time>\d{2}:\d{2}) (?P<sender>[^:]+): (?P<body>.*)$",
//!     ))
//!     .with_date_layout("%Y-%m-%d, %H:%M");
//!
//! let parser = ChatParser::with_config(config)?;
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

use serde::{Deserialize, Serialize};

/// A named header grammar.
///
/// `pattern` is a regular expression that must define the named groups
/// `date`, `time`, and `body`. Without a `sender` group the grammar matches
/// sender-less notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarSpec {
    /// Short identifier used in diagnostics
    pub name: String,
    /// Regular expression with `date`, `time`, `body` and usually `sender` groups
    pub pattern: String,
}

impl GrammarSpec {
    /// Creates a grammar from a name and a pattern.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// What a header gets as its timestamp when no date layout matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTimestamp {
    /// The instant the parse call started. Every fallback in one parse gets the
    /// same value, so those messages keep file order and sort after dated ones.
    #[default]
    ParseStart,
    /// The Unix epoch. Fully reproducible; fallbacks sort first.
    Epoch,
}

// Leading invisible marks some exporters leave in front of a header.
const INVISIBLE_PREFIX: &str = r"^[\x{200E}\x{200F}\x{FEFF}]*";
const DATE_TOKEN: &str = r"(?P<date>\d{1,2}[./]\d{1,2}[./]\d{2,4})";
const TIME_TOKEN: &str = r"(?P<time>\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AaPp]\.?\s?[Mm]\.?)?)";
const SENDER_AND_BODY: &str = r"(?P<sender>[^:]+):\s?(?P<body>.*)$";

/// Default header grammars in priority order.
fn default_grammars() -> Vec<GrammarSpec> {
    vec![
        // [15.03.2023, 14:05:12] Ana: Hello
        GrammarSpec::new(
            "bracketed",
            format!(r"{INVISIBLE_PREFIX}\[{DATE_TOKEN},?\s{TIME_TOKEN}\]\s{SENDER_AND_BODY}"),
        ),
        // 3/9/23, 2:05 PM - Ben: Hello
        GrammarSpec::new(
            "dashed",
            format!(r"{INVISIBLE_PREFIX}{DATE_TOKEN},?\s{TIME_TOKEN}\s[-–]\s{SENDER_AND_BODY}"),
        ),
        // 3/9/23, 2:10 PM - Ana added Ben (no sender, so no colon)
        GrammarSpec::new(
            "notice",
            format!(r"{INVISIBLE_PREFIX}{DATE_TOKEN},?\s{TIME_TOKEN}\s[-–]\s(?P<body>[^:]*)$"),
        ),
    ]
}

/// Default date/time layouts in priority order.
///
/// Applied to `"{date}, {time}"`. Two-digit-year layouts come before their
/// four-digit twins because `%Y` also accepts two digits.
fn default_date_layouts() -> Vec<String> {
    [
        // dotted: day first, 24h then 12h
        "%d.%m.%y, %H:%M:%S",
        "%d.%m.%y, %H:%M",
        "%d.%m.%Y, %H:%M:%S",
        "%d.%m.%Y, %H:%M",
        "%d.%m.%y, %I:%M:%S %p",
        "%d.%m.%y, %I:%M %p",
        "%d.%m.%Y, %I:%M:%S %p",
        "%d.%m.%Y, %I:%M %p",
        // slashed with meridiem: month first (US)
        "%m/%d/%y, %I:%M:%S %p",
        "%m/%d/%y, %I:%M %p",
        "%m/%d/%Y, %I:%M:%S %p",
        "%m/%d/%Y, %I:%M %p",
        // slashed 24h: day first
        "%d/%m/%y, %H:%M:%S",
        "%d/%m/%y, %H:%M",
        "%d/%m/%Y, %H:%M:%S",
        "%d/%m/%Y, %H:%M",
        // slashed, day first failed: month first
        "%m/%d/%y, %H:%M:%S",
        "%m/%d/%y, %H:%M",
        "%m/%d/%Y, %H:%M:%S",
        "%m/%d/%Y, %H:%M",
        // slashed with meridiem, month first failed: day first
        "%d/%m/%y, %I:%M:%S %p",
        "%d/%m/%y, %I:%M %p",
        "%d/%m/%Y, %I:%M:%S %p",
        "%d/%m/%Y, %I:%M %p",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_attachment_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "mov", "3gp", "avi", "mkv", "webm",
        "opus", "ogg", "mp3", "m4a", "aac", "wav", "amr", "pdf", "doc", "docx", "xls", "xlsx",
        "ppt", "pptx", "txt", "csv", "vcf", "zip",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// One member in a notice: "you", or words that each start with an
// upper-case or uncased letter, a digit, `+` or `~` (names, phone numbers).
// Case-sensitive even inside the case-insensitive set.
const MEMBER: &str = r"(?:you|(?-i:[\p{Lu}\p{Lt}\p{Lo}\d+~])[^\s<>():/.@,]*(?: (?-i:[\p{Lu}\p{Lt}\p{Lo}\d+~])[^\s<>():/.@,]*)*)";

/// Service notification phrasings, matched case-insensitively against the
/// whole trimmed body.
///
/// Membership notices only match when both sides look like member lists, so
/// "the train left" or "I added notes at www.example.com" stay user text.
fn default_system_patterns() -> Vec<String> {
    let members = format!(r"{MEMBER}(?:(?:, | and ){MEMBER})*");

    let mut patterns = vec![
        // members added / removed / joined / left
        format!(r"^{MEMBER} added {members}$"),
        format!(r"^{MEMBER} removed {members}$"),
        format!(r"^{MEMBER} left$"),
        format!(r"^{MEMBER} joined$"),
        format!(r"^{MEMBER} joined using this group's invite link$"),
    ];

    patterns.extend(
        [
            // group creation
            r"^.+ created (?:the )?group\b.*$",
            r"^.+ created this group$",
            // subject and settings
            r"^.+ changed the subject (?:from .+ )?to .+$",
            r"^.+ changed (?:this group's|the group's|the group) (?:settings|icon|description)\b.*$",
            r"^.+ deleted this group's icon$",
            r"^.+ turned (?:on|off) disappearing messages\b.*$",
            r"^.+ (?:is|are) now an admin$",
            r"^you're now an admin$",
            // phone numbers
            r"^.+ changed their phone number\b.*$",
            r"^.+ changed to \+?[\d\s()-]+$",
            // restore
            r"^.+ restored (?:this|the) group\b.*$",
            r"^this group was restored\b.*$",
            // calls
            r"^missed (?:group )?(?:voice |video )?call\b.*$",
            r"^(?:voice |video )?call ended\b.*$",
            r"^(?:voice|video) call(?:,.*)?$",
            r"^your security code with .+ changed\b.*$",
        ]
        .into_iter()
        .map(String::from),
    );

    patterns
}

fn default_discard_phrases() -> Vec<String> {
    [
        "messages and calls are end-to-end encrypted",
        "messages to this group are now secured with end-to-end encryption",
        "messages you send to this group are now secured with end-to-end encryption",
        "messages and calls are now end-to-end encrypted",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Configuration for [`ChatParser`](crate::ChatParser).
///
/// All catalogues are ordered where order matters (grammars, layouts) and are
/// compiled once when the parser is built.
///
/// # Example
///
/// ```rust
/// use chatlens::config::{FallbackTimestamp, ParserConfig};
///
/// let config = ParserConfig::new()
///     .with_attachment_extension("svg")
///     .with_fallback_timestamp(FallbackTimestamp::Epoch);
/// assert!(config.attachment_extensions.contains(&"svg".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Header grammars, tried in order; the first match wins.
    pub header_grammars: Vec<GrammarSpec>,

    /// chrono layouts for `"{date}, {time}"`, tried in order.
    pub date_layouts: Vec<String>,

    /// File extensions (without dot) recognized in attachment markers.
    pub attachment_extensions: Vec<String>,

    /// Case-insensitive patterns identifying service notifications.
    pub system_patterns: Vec<String>,

    /// Bodies equal to one of these (case-insensitive, after trim) are dropped.
    pub null_markers: Vec<String>,

    /// Bodies containing one of these (case-insensitive) are dropped.
    pub discard_phrases: Vec<String>,

    /// Archive entry suffix that identifies the transcript (default: `_chat.txt`).
    pub transcript_suffix: String,

    /// Transcript file extension for the fallback rule (default: `.txt`).
    pub transcript_extension: String,

    /// Case-insensitive token the fallback rule looks for (default: `chat`).
    pub transcript_token: String,

    /// Scheme prefixed to links written without one (default: `http://`).
    pub default_link_scheme: String,

    /// Timestamp used when no date layout matches.
    pub fallback_timestamp: FallbackTimestamp,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_grammars: default_grammars(),
            date_layouts: default_date_layouts(),
            attachment_extensions: default_attachment_extensions(),
            system_patterns: default_system_patterns(),
            null_markers: vec!["null".to_string()],
            discard_phrases: default_discard_phrases(),
            transcript_suffix: "_chat.txt".to_string(),
            transcript_extension: ".txt".to_string(),
            transcript_token: "chat".to_string(),
            default_link_scheme: "http://".to_string(),
            fallback_timestamp: FallbackTimestamp::default(),
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from JSON. Omitted fields keep their defaults.
    ///
    /// ```rust
    /// use chatlens::config::ParserConfig;
    ///
    /// let config = ParserConfig::from_json(r#"{"null_markers": ["null", "<media omitted>"]}"#)?;
    /// assert_eq!(config.null_markers.len(), 2);
    /// assert!(!config.header_grammars.is_empty());
    /// # Ok::<(), chatlens::ChatlensError>(())
    /// ```
    #[cfg(feature = "json-output")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Appends a header grammar with the lowest priority.
    #[must_use]
    pub fn with_grammar(mut self, grammar: GrammarSpec) -> Self {
        self.header_grammars.push(grammar);
        self
    }

    /// Replaces all header grammars.
    #[must_use]
    pub fn with_grammars(mut self, grammars: Vec<GrammarSpec>) -> Self {
        self.header_grammars = grammars;
        self
    }

    /// Appends a date layout with the lowest priority.
    #[must_use]
    pub fn with_date_layout(mut self, layout: impl Into<String>) -> Self {
        self.date_layouts.push(layout.into());
        self
    }

    /// Adds an extension to the attachment allow-list.
    #[must_use]
    pub fn with_attachment_extension(mut self, ext: impl Into<String>) -> Self {
        self.attachment_extensions.push(ext.into());
        self
    }

    /// Adds a system-notification pattern.
    #[must_use]
    pub fn with_system_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.system_patterns.push(pattern.into());
        self
    }

    /// Adds a discard phrase.
    #[must_use]
    pub fn with_discard_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.discard_phrases.push(phrase.into());
        self
    }

    /// Sets the scheme prefixed to bare links.
    #[must_use]
    pub fn with_default_link_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.default_link_scheme = scheme.into();
        self
    }

    /// Sets the fallback timestamp policy.
    #[must_use]
    pub fn with_fallback_timestamp(mut self, fallback: FallbackTimestamp) -> Self {
        self.fallback_timestamp = fallback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogues_populated() {
        let config = ParserConfig::default();
        assert_eq!(config.header_grammars.len(), 3);
        assert_eq!(config.header_grammars[0].name, "bracketed");
        assert_eq!(config.header_grammars[1].name, "dashed");
        assert_eq!(config.header_grammars[2].name, "notice");
        assert!(!config.date_layouts.is_empty());
        assert!(config.attachment_extensions.contains(&"jpg".to_string()));
        assert_eq!(config.null_markers, vec!["null".to_string()]);
        assert_eq!(config.fallback_timestamp, FallbackTimestamp::ParseStart);
    }

    #[test]
    fn test_two_digit_year_layouts_precede_four_digit() {
        let layouts = ParserConfig::default().date_layouts;
        let short = layouts.iter().position(|l| l == "%d.%m.%y, %H:%M").unwrap();
        let long = layouts.iter().position(|l| l == "%d.%m.%Y, %H:%M").unwrap();
        assert!(short < long);
    }

    #[test]
    fn test_builder_appends_in_order() {
        let config = ParserConfig::new()
            .with_grammar(GrammarSpec::new("custom", "x"))
            .with_date_layout("%Y-%m-%d, %H:%M")
            .with_default_link_scheme("https://");

        assert_eq!(config.header_grammars.last().unwrap().name, "custom");
        assert_eq!(config.date_layouts.last().unwrap(), "%Y-%m-%d, %H:%M");
        assert_eq!(config.default_link_scheme, "https://");
    }

    #[test]
    fn test_serde_partial_config_keeps_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"fallback_timestamp": "epoch"}"#).unwrap();
        assert_eq!(config.fallback_timestamp, FallbackTimestamp::Epoch);
        assert_eq!(config.header_grammars, ParserConfig::default().header_grammars);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ParserConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ParserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
