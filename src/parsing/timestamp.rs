//! Date/time normalization.
//!
//! Header date and time tokens come in many locale conventions. They are
//! joined as `"{date}, {time}"` and tried against an ordered list of chrono
//! layouts; the first layout that parses wins, so the same input always
//! yields the same instant.
//!
//! Two-digit years always map to `2000 + yy` (chrono's own `%y` pivots at
//! 1969, which is not what chat exports mean). There is no pivot-year
//! heuristic.
//!
//! Parsing never fails: input that matches no layout gets the configured
//! fallback instant and is flagged so callers can report degraded ordering.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use crate::config::FallbackTimestamp;

/// Result of normalizing one date/time pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// The instant (UTC; exports carry no zone information)
    pub instant: DateTime<Utc>,
    /// `true` when `instant` is the fallback value
    pub estimated: bool,
}

/// Converts header date/time tokens to instants.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    layouts: Vec<String>,
    fallback: FallbackTimestamp,
}

impl TimestampNormalizer {
    /// Creates a normalizer with the given layouts, in priority order.
    pub fn new(layouts: Vec<String>, fallback: FallbackTimestamp) -> Self {
        Self { layouts, fallback }
    }

    /// Resolves the fallback policy to a concrete instant for one parse call.
    ///
    /// `parse_start` is captured once per call so every fallback within a
    /// call shares the same value.
    pub fn fallback_instant(&self, parse_start: DateTime<Utc>) -> DateTime<Utc> {
        match self.fallback {
            FallbackTimestamp::ParseStart => parse_start,
            FallbackTimestamp::Epoch => DateTime::UNIX_EPOCH,
        }
    }

    /// Parses `date` and `time`, returning `None` if no layout matches.
    pub fn parse(&self, date: &str, time: &str) -> Option<DateTime<Utc>> {
        let input = format!("{}, {}", date.trim(), canonical_time(time));

        self.layouts.iter().find_map(|layout| {
            let naive = NaiveDateTime::parse_from_str(&input, layout).ok()?;
            let naive = if layout.contains("%y") {
                naive.with_year(2000 + naive.year().rem_euclid(100))?
            } else {
                naive
            };
            Some(naive.and_utc())
        })
    }

    /// Parses `date` and `time`, substituting `fallback` when nothing matches.
    pub fn to_instant(&self, date: &str, time: &str, fallback: DateTime<Utc>) -> ParsedTimestamp {
        match self.parse(date, time) {
            Some(instant) => ParsedTimestamp {
                instant,
                estimated: false,
            },
            None => ParsedTimestamp {
                instant: fallback,
                estimated: true,
            },
        }
    }
}

/// Uppercases the meridiem, drops its dots, and puts exactly one space
/// before it: `2:05pm`, `2:05 p.m.` and `2:05 PM` all become `2:05 PM`.
fn canonical_time(time: &str) -> String {
    let time = time.trim();
    let Some(start) = time.find(|c: char| c.is_ascii_alphabetic()) else {
        return time.to_string();
    };

    let (clock, meridiem) = time.split_at(start);
    let meridiem: String = meridiem
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    format!("{} {}", clock.trim_end(), meridiem)
}
