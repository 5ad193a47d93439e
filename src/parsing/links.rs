//! Link detection.
//!
//! Splits body text into alternating [`Segment::Text`] and [`Segment::Link`]
//! runs. Three link shapes are recognized: `scheme://…` URLs, `www.` hosts,
//! and bare `host.tld[/path]` names for a fixed set of common top-level
//! domains. Links without a scheme get the configured default scheme in their
//! resolved URL; the segment content always keeps the text as written, so
//! concatenating the contents reproduces the input exactly.

use regex::Regex;

use crate::error::{ChatlensError, Result};
use crate::message::Segment;

const LINK_PATTERN: &str = concat!(
    r#"(?i)\b(?:"#,
    r#"(?:https?|ftp)://[^\s<>"]+"#,
    r#"|www\.[^\s<>"]+"#,
    r#"|(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+"#,
    r#"(?:com|org|net|edu|gov|int|info|biz|io|co|me|app|dev|ly|gl|tv"#,
    r#"|de|uk|fr|es|it|nl|ru|ch|at|be|pl|se|no|dk|fi|pt|br|ca|us|eu|in|au|jp|cn|kr|tr|ua|kz)"#,
    r#"\b(?:/[^\s<>"]*)?"#,
    r")",
);

const SCHEME_PATTERN: &str = r"(?i)^[a-z][a-z0-9+.-]*://";

/// Finds links in text.
#[derive(Debug, Clone)]
pub struct LinkScanner {
    link: Regex,
    scheme: Regex,
    default_scheme: String,
}

impl LinkScanner {
    /// Creates a scanner that prefixes scheme-less links with `default_scheme`
    /// (for example `http://`).
    pub fn new(default_scheme: impl Into<String>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ChatlensError::invalid_pattern("link", pattern.to_string(), e))
        };
        Ok(Self {
            link: compile(LINK_PATTERN)?,
            scheme: compile(SCHEME_PATTERN)?,
            default_scheme: default_scheme.into(),
        })
    }

    /// Splits `text` into text and link segments.
    ///
    /// Empty text yields no segments. Adjacent text is never split into two
    /// segments.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pos = 0;
        let mut text_start = 0;

        while let Some(m) = self.link.find_at(text, pos) {
            let token = trim_trailing_punctuation(m.as_str());
            // `ann@mail.com` is an address, not a link
            if token.is_empty() || text[..m.start()].ends_with('@') {
                pos = m.end();
                continue;
            }

            let end = m.start() + token.len();
            if text_start < m.start() {
                segments.push(Segment::text(&text[text_start..m.start()]));
            }
            segments.push(Segment::link(token, self.resolve(token)));
            text_start = end;
            pos = end;
        }

        if text_start < text.len() {
            segments.push(Segment::text(&text[text_start..]));
        }
        segments
    }

    /// Returns the absolute URL for a matched link.
    pub fn resolve(&self, link: &str) -> String {
        if self.scheme.is_match(link) {
            link.to_string()
        } else {
            format!("{}{}", self.default_scheme, link)
        }
    }
}

/// Drops sentence punctuation glued to the end of a link. A closing
/// parenthesis is kept when the link itself opened one.
fn trim_trailing_punctuation(link: &str) -> &str {
    let mut link = link;
    loop {
        let Some(last) = link.chars().next_back() else {
            return link;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | ']' | '}' => true,
            ')' => link.matches('(').count() < link.matches(')').count(),
            _ => false,
        };
        if !strip {
            return link;
        }
        link = &link[..link.len() - last.len_utf8()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> LinkScanner {
        LinkScanner::new("http://").unwrap()
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(Segment::content).collect()
    }

    #[test]
    fn test_scenario_link_in_sentence() {
        let segs = scanner().segments("see www.example.com/x now");
        assert_eq!(
            segs,
            vec![
                Segment::text("see "),
                Segment::link("www.example.com/x", "http://www.example.com/x"),
                Segment::text(" now"),
            ]
        );
    }

    #[test]
    fn test_scheme_is_kept() {
        let segs = scanner().segments("https://rust-lang.org/learn");
        assert_eq!(
            segs,
            vec![Segment::link(
                "https://rust-lang.org/learn",
                "https://rust-lang.org/learn"
            )]
        );
    }

    #[test]
    fn test_bare_host() {
        let segs = scanner().segments("try example.com today");
        assert_eq!(segs[1], Segment::link("example.com", "http://example.com"));
    }

    #[test]
    fn test_trailing_punctuation_stays_text() {
        let segs = scanner().segments("Look: https://a.org/page.");
        assert_eq!(segs[1].content(), "https://a.org/page");
        assert_eq!(segs.last().unwrap().content(), ".");
    }

    #[test]
    fn test_balanced_parenthesis_kept() {
        let text = "(see https://en.wikipedia.org/wiki/Rust_(language))";
        let segs = scanner().segments(text);
        assert_eq!(segs[1].content(), "https://en.wikipedia.org/wiki/Rust_(language)");
        assert_eq!(joined(&segs), text);
    }

    #[test]
    fn test_multiple_links() {
        let text = "a http://x.io b www.y.de";
        let segs = scanner().segments(text);
        let links: Vec<_> = segs.iter().filter_map(Segment::url).collect();
        assert_eq!(links, vec!["http://x.io", "http://www.y.de"]);
        assert_eq!(joined(&segs), text);
    }

    #[test]
    fn test_no_links() {
        assert_eq!(
            scanner().segments("just words, report.pdf and e.g. this"),
            vec![Segment::text("just words, report.pdf and e.g. this")]
        );
    }

    #[test]
    fn test_email_is_not_link() {
        let segs = scanner().segments("mail ann@mail.com");
        assert_eq!(segs, vec![Segment::text("mail ann@mail.com")]);
    }

    #[test]
    fn test_empty_text() {
        assert!(scanner().segments("").is_empty());
    }

    #[test]
    fn test_coverage_is_exact_with_unicode() {
        let text = "Привет 👋 www.пример.com? нет, www.example.org!";
        assert_eq!(joined(&scanner().segments(text)), text);
    }

    #[test]
    fn test_custom_default_scheme() {
        let scanner = LinkScanner::new("https://").unwrap();
        assert_eq!(scanner.resolve("example.com"), "https://example.com");
        assert_eq!(scanner.resolve("FTP://files.net"), "FTP://files.net");
    }
}
