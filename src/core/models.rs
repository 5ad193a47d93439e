//! Output selection settings.

use crate::Message;

/// Configuration for output format.
/// Controls which messages and which fields are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Include timestamps in output
    pub include_timestamps: bool,
    /// Include the text/link segment breakdown
    pub include_segments: bool,
    /// Include attachment file names and kinds
    pub include_attachments: bool,
    /// Leave service notifications out
    pub skip_system: bool,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.include_timestamps = true;
        self
    }

    #[must_use]
    pub fn with_segments(mut self) -> Self {
        self.include_segments = true;
        self
    }

    #[must_use]
    pub fn with_attachments(mut self) -> Self {
        self.include_attachments = true;
        self
    }

    #[must_use]
    pub fn without_system(mut self) -> Self {
        self.skip_system = true;
        self
    }

    /// Returns `true` if `message` should be written.
    pub fn selects(&self, message: &Message) -> bool {
        !(self.skip_system && message.is_system_message)
    }
}
