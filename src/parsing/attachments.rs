//! Attachment marker extraction.
//!
//! Two surface syntaxes are recognized, restricted to an extension allow-list:
//!
//! - `<attached: 00000012-PHOTO-2023-03-09.jpg>` (iOS). The marker owns any
//!   text preceding it on its line; that text is removed with it.
//! - `IMG-20230309-WA0001.jpg (file attached)` (Android). The file name runs
//!   from the start of its line, so names with spaces survive
//!   (`Quarterly Report 2023.pdf (file attached)`). Text after the tag stays.
//!
//! A bracket opened right before a marker and closed right after it is
//! removed with the marker.

use regex::Regex;

use crate::error::{ChatlensError, Result};

/// Body text with attachment markers removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// The body with every marker cut out (not trimmed)
    pub remainder: String,
    /// Referenced file names in order of appearance
    pub file_names: Vec<String>,
}

/// Finds and strips attachment markers.
#[derive(Debug, Clone)]
pub struct AttachmentExtractor {
    // `None` when the allow-list is empty
    regex: Option<Regex>,
}

impl AttachmentExtractor {
    /// Builds the marker pattern for the given extension allow-list.
    pub fn new(extensions: &[String]) -> Result<Self> {
        let mut exts: Vec<String> = extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .map(regex::escape)
            .collect();
        // longest first so `jpeg` is never cut short by `jpg`-like prefixes
        exts.sort_by_key(|e| std::cmp::Reverse(e.len()));
        exts.dedup();

        if exts.is_empty() {
            return Ok(Self { regex: None });
        }
        let ext_group = format!("(?:{})", exts.join("|"));

        let pattern = format!(
            r"(?im)<attached:\s*(?P<tagged>[^<>\n]+?\.{ext_group})\s*>|^[^\S\n]*(?P<open>[(\[])?(?P<bare>[^\s<>()\[\]][^<>\n]*?\.{ext_group})\s+\(file attached\)"
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| ChatlensError::invalid_pattern("attachment extension", pattern, e))?;

        Ok(Self { regex: Some(regex) })
    }

    /// Removes every marker from `body`, collecting the file names.
    pub fn extract(&self, body: &str) -> Extraction {
        let mut remainder = String::with_capacity(body.len());
        let mut file_names = Vec::new();
        let mut cursor = 0;
        let Some(regex) = &self.regex else {
            return Extraction {
                remainder: body.to_string(),
                file_names,
            };
        };

        for caps in regex.captures_iter(body) {
            let (Some(whole), Some(name)) =
                (caps.get(0), caps.name("tagged").or_else(|| caps.name("bare")))
            else {
                continue;
            };

            let mut start = whole.start().max(cursor);
            let mut end = whole.end();

            // an iOS marker owns the text before it on its line
            let opener = if caps.name("tagged").is_some() {
                start = body[..start].rfind('\n').map_or(0, |i| i + 1).max(cursor);
                body[start..whole.start().max(start)].trim_end().chars().next_back()
            } else {
                caps.name("open").and_then(|m| m.as_str().chars().next())
            };

            let closer = match opener {
                Some('(') => Some(')'),
                Some('[') => Some(']'),
                _ => None,
            };
            if let Some(close) = closer.filter(|c| body[end..].starts_with(*c)) {
                end += close.len_utf8();
            }

            remainder.push_str(&body[cursor..start]);
            cursor = end;
            file_names.push(name.as_str().trim().to_string());
        }

        remainder.push_str(&body[cursor..]);
        Extraction {
            remainder,
            file_names,
        }
    }
}
