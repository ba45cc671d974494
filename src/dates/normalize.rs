//! Date normalization: raw extracted values to canonical UTC instants.
//!
//! Every instant compared anywhere in the pipeline comes through
//! [`DateNormalizer::normalize`]. Numeric values pass through as epoch
//! seconds; free text is parsed against a tolerant format list, resolved in
//! the default zone when it carries no offset, and adjusted for two common
//! lies in scraped dates: bare midnight (almost never a real publication
//! time) and a trailing bare `T` resolved under a standard-time assumption.

use std::sync::LazyLock;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::{OffsetComponents, Tz};
use regex::Regex;

/// A raw date value as produced by an extraction heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDate {
    /// Epoch seconds; passed through with no adjustment.
    Epoch(i64),
    /// Free text requiring parsing.
    Text(String),
}

impl RawDate {
    /// Classify an extracted string. A purely numeric string is interpreted
    /// as epoch seconds, anything else as text.
    pub fn from_extracted(s: &str) -> Option<RawDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse().ok().map(RawDate::Epoch)
        } else {
            Some(RawDate::Text(s.to_string()))
        }
    }
}

/// Naive datetime formats tried after comma/period cleanup.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Bare-date formats; time defaults to midnight and then gets the noon shift.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d %Y", "%d %B %Y", "%m/%d/%Y"];

/// Period after an abbreviated month name ("Jan. 17" style).
static MONTH_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.").unwrap()
});

/// "Sept" is common in news copy but is not a chrono-recognized abbreviation.
static SEPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsept\b").unwrap());

/// North American zone abbreviations seen in wire-style datelines.
fn zone_abbreviation_offset(token: &str) -> Option<FixedOffset> {
    let hours = match token.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        "AKST" => -9,
        "AKDT" => -8,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Converts heterogeneous raw date values into canonical UTC instants.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    zone: Tz,
}

impl DateNormalizer {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Normalize a raw value. Unparseable text yields None, not an error.
    pub fn normalize(&self, raw: &RawDate) -> Option<DateTime<Utc>> {
        match raw {
            RawDate::Epoch(secs) => DateTime::from_timestamp(*secs, 0),
            RawDate::Text(text) => self.normalize_text(text),
        }
    }

    fn normalize_text(&self, text: &str) -> Option<DateTime<Utc>> {
        let mut text = text.trim();
        // A trailing bare "T" is an ISO-like terminator with no offset. Its
        // default-zone reading assumes standard time, which runs an hour
        // behind during daylight saving. Only a digit-adjacent "T" counts:
        // zone abbreviations like EST or GMT also end in 'T'.
        let bare_t = text.len() > 1
            && text.ends_with('T')
            && text[..text.len() - 1].ends_with(|c: char| c.is_ascii_digit());
        if bare_t {
            text = text[..text.len() - 1].trim_end();
        }
        let instant = self.parse_text(text)?;
        if bare_t && self.in_dst(instant) {
            Some(instant + Duration::hours(1))
        } else {
            Some(instant)
        }
    }

    fn parse_text(&self, text: &str) -> Option<DateTime<Utc>> {
        // Explicit-offset forms first; the offset in the text wins.
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(noon_correct_fixed(dt).with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(noon_correct_fixed(dt).with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z"] {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Some(noon_correct_fixed(dt).with_timezone(&Utc));
            }
        }

        let cleaned = cleanup(text);
        let (body, offset) = split_zone_abbreviation(&cleaned);
        let naive = noon_correct(parse_naive(body)?);
        match offset {
            Some(off) => off
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            None => self
                .zone
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn in_dst(&self, instant: DateTime<Utc>) -> bool {
        self.zone
            .offset_from_utc_datetime(&instant.naive_utc())
            .dst_offset()
            != Duration::zero()
    }
}

/// Bare midnight almost always means "unspecified time of day"; noon keeps
/// the instant on the same calendar day in any nearby zone.
fn noon_correct(naive: NaiveDateTime) -> NaiveDateTime {
    if naive.time() == NaiveTime::MIN {
        naive + Duration::hours(12)
    } else {
        naive
    }
}

fn noon_correct_fixed(dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    if dt.time() == NaiveTime::MIN {
        dt + Duration::hours(12)
    } else {
        dt
    }
}

/// Normalize punctuation quirks so a short format list covers news-style
/// dates: month-abbreviation periods, "Sept", and commas.
fn cleanup(text: &str) -> String {
    let text = MONTH_DOT.replace_all(text, "$1");
    let text = SEPT.replace_all(&text, "Sep");
    text.replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a trailing zone abbreviation off the text, if one is present.
fn split_zone_abbreviation(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some((body, last)) = text.rsplit_once(' ') {
        if let Some(offset) = zone_abbreviation_offset(last) {
            return (body, Some(offset));
        }
    }
    (text, None)
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}
