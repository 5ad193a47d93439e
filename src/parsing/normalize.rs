//! Text decoding and cleanup.
//!
//! Exported transcripts carry invisible characters that sit between visually
//! adjacent tokens (for example a left-to-right mark before `<attached: …>`,
//! or a narrow no-break space between `2:05` and `PM`). They break header
//! matching, so every byte stream passes through [`normalize`] before any
//! pattern is applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChatlensError, Result};

/// Text encoding of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8 (WhatsApp's export encoding)
    #[default]
    Utf8,
    /// UTF-16, little endian
    Utf16Le,
    /// UTF-16, big endian
    Utf16Be,
}

impl TextEncoding {
    /// Picks an encoding from a byte-order mark, defaulting to UTF-8.
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0xFF, 0xFE, ..] => TextEncoding::Utf16Le,
            [0xFE, 0xFF, ..] => TextEncoding::Utf16Be,
            _ => TextEncoding::Utf8,
        }
    }

    /// Decodes `bytes`, failing on any invalid sequence.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| ChatlensError::decode(self, e.to_string())),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(ChatlensError::decode(
                        self,
                        format!("odd byte length {}", bytes.len()),
                    ));
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if self == TextEncoding::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                char::decode_utf16(units)
                    .collect::<std::result::Result<String, _>>()
                    .map_err(|e| ChatlensError::decode(self, e.to_string()))
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Utf16Le => write!(f, "UTF-16LE"),
            TextEncoding::Utf16Be => write!(f, "UTF-16BE"),
        }
    }
}

/// Returns `true` for marks that are removed outright.
///
/// Covers bidi marks, embeddings and isolates, the word joiner, the byte
/// order mark, and C0 controls other than newline and tab.
pub fn is_invisible_mark(c: char) -> bool {
    matches!(
        c,
        '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}' | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    ) || (c.is_ascii_control() && c != '\n' && c != '\t' && c != '\u{7F}')
}

/// Cleans already-decoded text.
///
/// - `\r\n` and lone `\r` become `\n`
/// - narrow no-break space (U+202F) becomes an ordinary space
/// - invisible marks (see [`is_invisible_mark`]) are removed
///
/// The function is idempotent: `normalize_text(&normalize_text(x)) == normalize_text(x)`.
///
/// ```
/// use chatlens::parsing::normalize::normalize_text;
///
/// assert_eq!(normalize_text("2:05\u{202F}PM\r\n\u{200E}hi"), "2:05 PM\nhi");
/// ```
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push('\n');
                }
            }
            '\u{202F}' => out.push(' '),
            c if is_invisible_mark(c) => {}
            c => out.push(c),
        }
    }

    out
}

/// Decodes `raw` with `encoding` and normalizes the result.
///
/// A leading byte-order mark is dropped along with the other invisible marks.
pub fn normalize(raw: &[u8], encoding: TextEncoding) -> Result<String> {
    let raw = match encoding {
        TextEncoding::Utf16Le if raw.starts_with(&[0xFF, 0xFE]) => &raw[2..],
        TextEncoding::Utf16Be if raw.starts_with(&[0xFE, 0xFF]) => &raw[2..],
        _ => raw,
    };
    let decoded = encoding.decode(raw)?;
    Ok(normalize_text(&decoded))
}
