//! Line classification.
//!
//! A transcript line either starts a new message (it matches one of the
//! registered header grammars) or continues the message above it. Grammars
//! are tried in registration order and the first match wins, so a permissive
//! grammar registered late can never shadow a stricter one registered early.
//!
//! # Known limitation
//!
//! The sender is everything up to the first colon after the time token. A
//! sender name that itself contains a colon is split there and the rest of the
//! name becomes part of the body.
//!
//! # Notices
//!
//! A grammar without a `sender` group recognizes lines the exporter writes
//! itself (`3/9/23, 2:10 PM - Ana added Ben`). Those headers carry an empty
//! sender; see [`MessageHeader::is_notice`].

use regex::Regex;

use crate::config::GrammarSpec;
use crate::error::{ChatlensError, Result};

/// Fields extracted from a header line. Borrowed from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader<'a> {
    /// Date token as written (`15.03.2023`, `3/9/23`)
    pub date: &'a str,
    /// Time token as written, meridiem included (`14:05:12`, `2:05 PM`)
    pub time: &'a str,
    /// Sender name, trimmed; empty for a notice
    pub sender: &'a str,
    /// Rest of the line: the first line of the body
    pub remainder: &'a str,
}

impl MessageHeader<'_> {
    /// Returns `true` if the line names no sender.
    pub fn is_notice(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Classification of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The line starts a new message.
    Header(MessageHeader<'a>),
    /// The line belongs to the message above it.
    Continuation,
}

/// A header grammar: a pure function from a line to an optional header.
pub trait HeaderGrammar: Send + Sync {
    /// Identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the header fields if `line` starts a message.
    fn match_line<'a>(&self, line: &'a str) -> Option<MessageHeader<'a>>;
}

/// A [`HeaderGrammar`] backed by a regular expression with the named groups
/// `date`, `time` and `body`, plus `sender` unless it matches notices.
#[derive(Debug, Clone)]
pub struct RegexGrammar {
    name: String,
    regex: Regex,
    has_sender: bool,
}

impl RegexGrammar {
    const REQUIRED_GROUPS: [&'static str; 3] = ["date", "time", "body"];

    /// Compiles a grammar, checking that every required group exists.
    pub fn compile(spec: &GrammarSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern)
            .map_err(|e| ChatlensError::invalid_pattern("header grammar", &spec.name, e))?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        if let Some(missing) = Self::REQUIRED_GROUPS
            .iter()
            .find(|group| !names.contains(group))
        {
            return Err(ChatlensError::invalid_format(
                "header grammar",
                format!("grammar '{}' has no '{}' group", spec.name, missing),
            ));
        }

        Ok(Self {
            name: spec.name.clone(),
            has_sender: names.contains(&"sender"),
            regex,
        })
    }
}

impl HeaderGrammar for RegexGrammar {
    fn name(&self) -> &str {
        &self.name
    }

    fn match_line<'a>(&self, line: &'a str) -> Option<MessageHeader<'a>> {
        let caps = self.regex.captures(line)?;
        let field = |group: &str| caps.name(group).map_or("", |m| m.as_str());

        let sender = field("sender").trim();
        if self.has_sender && sender.is_empty() {
            return None;
        }

        Some(MessageHeader {
            date: field("date").trim(),
            time: field("time").trim(),
            sender,
            remainder: field("body"),
        })
    }
}

/// Ordered set of header grammars.
pub struct LineClassifier {
    grammars: Vec<Box<dyn HeaderGrammar>>,
}

impl LineClassifier {
    /// Compiles the given grammar specs, preserving their order.
    pub fn from_specs(specs: &[GrammarSpec]) -> Result<Self> {
        let grammars = specs
            .iter()
            .map(|spec| RegexGrammar::compile(spec).map(|g| Box::new(g) as Box<dyn HeaderGrammar>))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { grammars })
    }

    /// Appends a grammar with the lowest priority.
    pub fn push(&mut self, grammar: impl HeaderGrammar + 'static) {
        self.grammars.push(Box::new(grammar));
    }

    /// Names of the registered grammars in priority order.
    pub fn grammar_names(&self) -> Vec<&str> {
        self.grammars.iter().map(|g| g.name()).collect()
    }

    /// Classifies one normalized line.
    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        self.grammars
            .iter()
            .find_map(|grammar| grammar.match_line(line))
            .map_or(LineKind::Continuation, LineKind::Header)
    }
}

impl std::fmt::Debug for LineClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineClassifier")
            .field("grammars", &self.grammar_names())
            .finish()
    }
}
