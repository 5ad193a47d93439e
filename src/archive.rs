//! Export archives: the transcript plus its media files.
//!
//! An export is modelled as a map from entry name to bytes. [`read_zip`]
//! builds that map from a `.zip` export; callers with another container
//! format can fill an [`ArchiveEntries`] themselves.
//!
//! # Example
//!
//! ```rust
//! use chatlens::archive::ArchiveEntries;
//! use chatlens::config::ParserConfig;
//!
//! let mut entries = ArchiveEntries::new();
//! entries.insert("_chat.txt", b"[01.01.2024, 09:00:00] Ana: hi".to_vec());
//! entries.insert("IMG-0001.jpg", vec![0xFF, 0xD8]);
//!
//! let (name, _bytes) = entries.find_transcript(&ParserConfig::default())?;
//! assert_eq!(name, "_chat.txt");
//! assert!(entries.media_index(name).contains("IMG-0001.jpg"));
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

use std::collections::BTreeMap;

use crate::config::ParserConfig;
use crate::error::{ChatlensError, Result};
use crate::parsing::media::MediaIndex;

/// Non-directory archive entries, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveEntries {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArchiveEntries {
    /// Creates an empty set of entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Directory names (ending in `/`) are ignored.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        if !name.ends_with('/') {
            self.entries.insert(name, bytes);
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bytes of `name`.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Iterates over entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Picks the chat transcript.
    ///
    /// An entry ending with the transcript suffix wins. Failing that, the
    /// first entry whose file name contains the transcript token (ignoring
    /// case) and ends with the transcript extension is used.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::NoTranscriptFound`] if nothing matches,
    /// [`ChatlensError::EmptyTranscript`] if the chosen entry has no bytes.
    pub fn find_transcript(&self, config: &ParserConfig) -> Result<(&str, &[u8])> {
        let token = config.transcript_token.to_lowercase();
        let extension = config.transcript_extension.to_lowercase();

        let by_suffix = self
            .entries
            .iter()
            .find(|(name, _)| name.ends_with(&config.transcript_suffix));
        let by_token = || {
            self.entries.iter().find(|(name, _)| {
                let file = file_name(name).to_lowercase();
                file.contains(&token) && file.ends_with(&extension)
            })
        };

        let (name, bytes) = by_suffix
            .or_else(by_token)
            .ok_or(ChatlensError::NoTranscriptFound {
                entries: self.entries.len(),
            })?;

        if bytes.is_empty() {
            return Err(ChatlensError::EmptyTranscript { name: name.clone() });
        }
        Ok((name.as_str(), bytes.as_slice()))
    }

    /// Builds the media index from every entry except the transcript.
    pub fn media_index(&self, transcript: &str) -> MediaIndex {
        MediaIndex::from_names(self.names().filter(|name| *name != transcript))
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<u8>)> for ArchiveEntries {
    fn from_iter<I: IntoIterator<Item = (S, Vec<u8>)>>(iter: I) -> Self {
        let mut entries = Self::new();
        for (name, bytes) in iter {
            entries.insert(name, bytes);
        }
        entries
    }
}

fn file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Reads every file entry of a zip archive into memory.
#[cfg(feature = "archive")]
pub fn read_zip(bytes: &[u8]) -> Result<ArchiveEntries> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let mut entries = ArchiveEntries::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut buf = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut buf)?;
        entries.insert(name, buf);
    }

    tracing::debug!(entries = entries.len(), "read zip archive");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[(&str, &[u8])]) -> ArchiveEntries {
        items.iter().map(|(n, b)| (*n, b.to_vec())).collect()
    }

    #[test]
    fn test_suffix_match_preferred() {
        let e = entries(&[("a chat.txt", b"x"), ("_chat.txt", b"y"), ("IMG.jpg", b"z")]);
        let (name, bytes) = e.find_transcript(&ParserConfig::default()).unwrap();
        assert_eq!(name, "_chat.txt");
        assert_eq!(bytes, b"y");
    }

    #[test]
    fn test_token_match_fallback() {
        let e = entries(&[("WhatsApp Chat with Ana.txt", b"x"), ("IMG.jpg", b"z")]);
        let (name, _) = e.find_transcript(&ParserConfig::default()).unwrap();
        assert_eq!(name, "WhatsApp Chat with Ana.txt");
    }

    #[test]
    fn test_token_requires_extension() {
        let e = entries(&[("chat.pdf", b"x")]);
        let err = e.find_transcript(&ParserConfig::default()).unwrap_err();
        assert!(err.is_no_transcript());
        assert!(err.to_string().contains("1 archive entries"));
    }

    #[test]
    fn test_empty_transcript() {
        let e = entries(&[("_chat.txt", b"")]);
        let err = e.find_transcript(&ParserConfig::default()).unwrap_err();
        assert!(err.is_empty_transcript());
        assert!(err.to_string().contains("_chat.txt"));
    }

    #[test]
    fn test_directories_ignored() {
        let mut e = ArchiveEntries::new();
        e.insert("media/", Vec::new());
        e.insert("media/IMG.jpg", vec![1]);
        assert_eq!(e.len(), 1);
        assert!(e.get("media/").is_none());
    }

    #[test]
    fn test_media_index_excludes_transcript() {
        let e = entries(&[("_chat.txt", b"x"), ("IMG.jpg", b"z")]);
        let index = e.media_index("_chat.txt");
        assert_eq!(index.len(), 1);
        assert!(!index.contains("_chat.txt"));
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_read_zip() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.add_directory("media/", SimpleFileOptions::default()).unwrap();
            zip.start_file("_chat.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"[01.01.2024, 09:00:00] Ana: hi").unwrap();
            zip.start_file("media/IMG.jpg", SimpleFileOptions::default()).unwrap();
            zip.write_all(&[0xFF, 0xD8]).unwrap();
            zip.finish().unwrap();
        }

        let e = read_zip(buf.get_ref()).unwrap();
        assert_eq!(e.names().collect::<Vec<_>>(), vec!["_chat.txt", "media/IMG.jpg"]);
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_read_zip_garbage() {
        let err = read_zip(b"not a zip").unwrap_err();
        assert!(matches!(err, ChatlensError::Archive(_)));
    }
}
