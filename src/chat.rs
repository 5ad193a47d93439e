//! The parse result: ordered messages plus the set of senders.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChatlensError, Result};
use crate::message::Message;

/// Counters collected during one scan of a transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines seen after normalization
    pub lines: usize,
    /// Lines that started a new message
    pub header_lines: usize,
    /// Lines appended to the message under construction
    pub continuation_lines: usize,
    /// Non-blank lines seen before any header (belong to no message)
    pub dropped_lines: usize,
    /// Bodies removed by the discard catalogue (null markers, encryption notices)
    pub discarded_bodies: usize,
    /// Service notifications emitted
    pub system_messages: usize,
    /// Headers whose date/time matched no layout
    pub fallback_timestamps: usize,
}

impl ParseStats {
    /// Non-blank lines that carried any content.
    pub fn content_lines(&self) -> usize {
        self.header_lines + self.continuation_lines + self.dropped_lines
    }
}

/// Why a parse produced no participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Degradation {
    /// The transcript held no non-blank line at all.
    EmptyInput,
    /// The transcript had content, but no line named a sender.
    NoHeaders {
        /// Non-blank lines that were seen
        content_lines: usize,
    },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::EmptyInput => {
                write!(f, "the transcript contains nothing recognizable")
            }
            Degradation::NoHeaders { content_lines } => write!(
                f,
                "the transcript has {content_lines} lines of content but no sender could be identified"
            ),
        }
    }
}

/// A parsed chat: messages sorted by timestamp and the senders seen.
///
/// Built once per parse call and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Messages in ascending timestamp order; ties keep file order.
    pub messages: Vec<Message>,
    /// Every sender name that headed at least one transcript entry.
    pub participants: BTreeSet<String>,
    /// Scan counters.
    #[serde(default)]
    pub stats: ParseStats,
}

impl Chat {
    /// Returns the messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the participant set.
    pub fn participants(&self) -> &BTreeSet<String> {
        &self.participants
    }

    /// Returns `true` if no message was emitted.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the degraded outcome, if no sender was identified.
    pub fn degradation(&self) -> Option<Degradation> {
        if !self.participants.is_empty() {
            return None;
        }
        match self.stats.content_lines() {
            0 => Some(Degradation::EmptyInput),
            content_lines => Some(Degradation::NoHeaders { content_lines }),
        }
    }

    /// Turns the degraded outcome into [`ChatlensError::NoParticipantsFound`].
    pub fn require_participants(self) -> Result<Self> {
        match self.degradation() {
            Some(reason) => Err(ChatlensError::NoParticipantsFound(reason)),
            None => Ok(self),
        }
    }

    /// Messages sent by `sender`, in display order.
    pub fn messages_from<'a>(&'a self, sender: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages.iter().filter(move |m| m.sender == sender)
    }
}
