//! Attachment resolution against the files shipped with a transcript.

use std::collections::HashSet;

use crate::message::AttachmentKind;

/// Names of the media files available next to a transcript.
///
/// A referenced file name resolves if it equals an entry name, or the final
/// path component of one (archives often nest media in a folder).
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    names: HashSet<String>,
    basenames: HashSet<String>,
}

impl MediaIndex {
    /// An index with no files: every attachment resolves to
    /// [`AttachmentKind::Missing`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an index from entry names. Directory entries (ending in `/`)
    /// are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || name.ends_with('/') {
                continue;
            }
            index.basenames.insert(basename(name).to_string());
            index.names.insert(name.to_string());
        }
        index
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no file is indexed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if `file_name` refers to an indexed file.
    pub fn contains(&self, file_name: &str) -> bool {
        self.names.contains(file_name) || self.basenames.contains(basename(file_name))
    }

    /// Resolves a referenced file name to its kind.
    ///
    /// Present files are classified by extension; absent files are
    /// [`AttachmentKind::Missing`].
    pub fn resolve(&self, file_name: &str) -> AttachmentKind {
        if self.contains(file_name) {
            AttachmentKind::from_file_name(file_name)
        } else {
            AttachmentKind::Missing
        }
    }
}

fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
