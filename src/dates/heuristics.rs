//! Extraction heuristics for publication dates.
//!
//! An ordered registry of independent strategies over markup and URL text.
//! Order encodes signal reliability: structured metadata first, URL patterns
//! next, free-text scans last. Each heuristic is a pure function from an
//! extraction context to an optional raw date value; each carries a fixture
//! snippet used by the startup self-test.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use url::Url;

use crate::models::Story;

use super::index::IndexedHtml;
use super::normalize::{DateNormalizer, RawDate};

/// Everything a heuristic may look at for one story.
pub struct ExtractCtx<'a> {
    pub story: &'a Story,
    /// Raw markup as fetched.
    pub raw: &'a str,
    /// Indexed view of the same markup.
    pub doc: &'a IndexedHtml,
    pub normalizer: &'a DateNormalizer,
    /// Inclusive year bounds for URL-extracted dates.
    pub year_range: (i32, i32),
}

/// One extraction strategy plus its self-test fixture.
pub struct Heuristic {
    pub name: &'static str,
    pub extract: fn(&ExtractCtx) -> Option<RawDate>,
    /// Markup snippet that must normalize to the shared reference instant.
    pub fixture: Option<&'static str>,
}

/// The fixed heuristic chain, highest-priority first.
pub fn registry() -> Vec<Heuristic> {
    vec![
        Heuristic {
            name: "dc_date_issued",
            extract: dc_date_issued,
            fixture: Some(DC_DATE_ISSUED_FIXTURE),
        },
        Heuristic {
            name: "dc_created",
            extract: dc_created,
            fixture: Some(DC_CREATED_FIXTURE),
        },
        Heuristic {
            name: "meta_publish_date",
            extract: meta_publish_date,
            fixture: Some(META_PUBLISH_DATE_FIXTURE),
        },
        Heuristic {
            name: "storydate",
            extract: storydate,
            fixture: Some(STORYDATE_FIXTURE),
        },
        Heuristic {
            name: "data_timestamp",
            extract: data_timestamp,
            fixture: Some(DATA_TIMESTAMP_FIXTURE),
        },
        Heuristic {
            name: "time_datetime",
            extract: time_datetime,
            fixture: Some(TIME_DATETIME_FIXTURE),
        },
        Heuristic {
            name: "url_and_dateline",
            extract: url_and_dateline,
            fixture: Some(URL_AND_DATELINE_FIXTURE),
        },
        Heuristic {
            name: "url_date",
            extract: url_date,
            fixture: Some(URL_DATE_FIXTURE),
        },
        Heuristic {
            name: "class_date",
            extract: class_date,
            fixture: Some(CLASS_DATE_FIXTURE),
        },
        Heuristic {
            name: "text_date",
            extract: text_date,
            fixture: Some(TEXT_DATE_FIXTURE),
        },
    ]
}

/// Month-name date with optional time-of-day and zone, as it appears in
/// article bodies and datelines ("January 17, 2012, 12:00 PM EST").
static TEXT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+\d{1,2},?\s+\d{4}(?:,?\s+\d{1,2}:\d{2}(?::\d{2})?\s?[ap]m(?:\s+(?-i:[A-Z]{2,4}))?)?",
    )
    .unwrap()
});

/// `YYYY/MM/DD` path segments.
static URL_SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{4})/(\d{1,2})/(\d{1,2})(?:[/?#]|$)").unwrap());

/// Compact `YYYYMMDD` path segments.
static URL_COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[/._-])(\d{4})(\d{2})(\d{2})(?:[/?#._-]|$)").unwrap());

const DC_DATE_ISSUED_FIXTURE: &str =
    r#"<meta name="DC.date.issued" content="2012-01-17T12:00:00-05:00"/>"#;

/// Dublin Core issue date metadata.
fn dc_date_issued(ctx: &ExtractCtx) -> Option<RawDate> {
    let value = ctx
        .doc
        .first_attr(r#"meta[name="DC.date.issued"]"#, "content")?;
    RawDate::from_extracted(&value)
}

const DC_CREATED_FIXTURE: &str =
    r#"<li property="dc:date dc:created" content="2012-01-17T12:00:00-05:00">January 17, 2012</li>"#;

/// RDFa dc:date/dc:created property markup.
fn dc_created(ctx: &ExtractCtx) -> Option<RawDate> {
    let value = ctx
        .doc
        .first_attr(r#"[property="dc:date dc:created"]"#, "content")?;
    RawDate::from_extracted(&value)
}

const META_PUBLISH_DATE_FIXTURE: &str =
    r#"<meta name="pub_date" content="2012-01-17 12:00:00 EST"/>"#;

/// Publisher-specific meta publish-date fields.
fn meta_publish_date(ctx: &ExtractCtx) -> Option<RawDate> {
    let value = ctx
        .doc
        .first_attr(r#"meta[name="pub_date"]"#, "content")
        .or_else(|| ctx.doc.first_attr(r#"meta[name="publish-date"]"#, "content"))?;
    RawDate::from_extracted(&value)
}

const STORYDATE_FIXTURE: &str = r#"<p class="storydate">Jan. 17, 2012</p>"#;

/// A page-specific "storydate" text element.
fn storydate(ctx: &ExtractCtx) -> Option<RawDate> {
    let text = ctx.doc.first_text(".storydate")?;
    RawDate::from_extracted(&text)
}

const DATA_TIMESTAMP_FIXTURE: &str =
    r#"<span class="date" data-unix-timestamp="1326819600">9:47 am</span>"#;

/// An explicit numeric timestamp attribute. Only digits qualify.
fn data_timestamp(ctx: &ExtractCtx) -> Option<RawDate> {
    let value = ctx
        .doc
        .first_attr("[data-unix-timestamp]", "data-unix-timestamp")?;
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok().map(RawDate::Epoch)
    } else {
        None
    }
}

const TIME_DATETIME_FIXTURE: &str =
    r#"<time datetime="2012-01-17T12:00:00-05:00">January 17, 2012</time>"#;

/// HTML5 machine-readable time element.
fn time_datetime(ctx: &ExtractCtx) -> Option<RawDate> {
    let value = ctx.doc.first_attr("time[datetime]", "datetime")?;
    RawDate::from_extracted(&value)
}

const URL_AND_DATELINE_FIXTURE: &str =
    r#"<p class="dateline">posted: January 17, 2012, 12:00 PM EST</p>"#;

/// Cross-check of the URL-embedded date against a dateline in the body.
///
/// A dateline instant on the same day but later than the bare URL date is a
/// time-of-day refinement of it and wins; anything else falls back to the
/// URL date. Returned as epoch seconds so re-normalization is a no-op.
fn url_and_dateline(ctx: &ExtractCtx) -> Option<RawDate> {
    let url_raw = url_date_value(ctx)?;
    let url_instant = ctx.normalizer.normalize(&url_raw)?;
    let dateline_instant = ctx
        .doc
        .first_text(".dateline")
        .and_then(|t| TEXT_DATE.find(&t).map(|m| m.as_str().to_string()))
        .and_then(|s| RawDate::from_extracted(&s))
        .and_then(|r| ctx.normalizer.normalize(&r));
    match dateline_instant {
        Some(t) if t > url_instant && t - url_instant < Duration::days(1) => {
            Some(RawDate::Epoch(t.timestamp()))
        }
        _ => Some(RawDate::Epoch(url_instant.timestamp())),
    }
}

const URL_DATE_FIXTURE: &str = "<html><body><p>No dates in the body.</p></body></html>";

/// URL-embedded date alone.
fn url_date(ctx: &ExtractCtx) -> Option<RawDate> {
    url_date_value(ctx)
}

const CLASS_DATE_FIXTURE: &str = r#"<p class="date">Jan 17, 2012</p>"#;

/// Generic class="date" element text.
fn class_date(ctx: &ExtractCtx) -> Option<RawDate> {
    let text = ctx.doc.first_text(".date")?;
    RawDate::from_extracted(&text)
}

const TEXT_DATE_FIXTURE: &str =
    "<div><p>WASHINGTON - This dispatch was filed January 17, 2012 by the bureau desk.</p></div>";

/// Free-text month-name scan over the raw markup. Weakest signal.
fn text_date(ctx: &ExtractCtx) -> Option<RawDate> {
    let found = TEXT_DATE.find(ctx.raw)?;
    RawDate::from_extracted(found.as_str())
}

/// Extract a date from the story's URLs, redirect URL first.
///
/// Both encodings are tried on each URL's path; the first triple whose year
/// falls inside the configured range and that forms a real calendar date
/// wins. Yields a bare `YYYY-MM-DD`, so the noon shift applies downstream.
fn url_date_value(ctx: &ExtractCtx) -> Option<RawDate> {
    let urls = [ctx.story.redirect_url.as_deref(), Some(ctx.story.url.as_str())];
    for url in urls.into_iter().flatten() {
        let path = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        for pattern in [&*URL_SLASH_DATE, &*URL_COMPACT_DATE] {
            for caps in pattern.captures_iter(&path) {
                if let Some(raw) = validated_triple(&caps, ctx.year_range) {
                    return Some(raw);
                }
            }
        }
    }
    None
}

fn validated_triple(caps: &regex::Captures, (min, max): (i32, i32)) -> Option<RawDate> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    if year < min || year > max || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(RawDate::Text(format!("{year:04}-{month:02}-{day:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: i64 = 1_326_819_600;

    fn story(url: &str) -> Story {
        Story {
            id: 1,
            url: url.to_string(),
            redirect_url: None,
            publish_date: None,
        }
    }

    fn extract(heuristic_name: &str, story: &Story, raw: &str) -> Option<i64> {
        let normalizer = DateNormalizer::new(chrono_tz::America::New_York);
        let doc = IndexedHtml::parse(raw);
        let ctx = ExtractCtx {
            story,
            raw,
            doc: &doc,
            normalizer: &normalizer,
            year_range: (2000, 2020),
        };
        let heuristic = registry()
            .into_iter()
            .find(|h| h.name == heuristic_name)
            .unwrap();
        (heuristic.extract)(&ctx)
            .and_then(|raw| normalizer.normalize(&raw))
            .map(|dt| dt.timestamp())
    }

    #[test]
    fn test_registry_order_is_fixed() {
        let names: Vec<&str> = registry().iter().map(|h| h.name).collect();
        assert_eq!(
            names,
            vec![
                "dc_date_issued",
                "dc_created",
                "meta_publish_date",
                "storydate",
                "data_timestamp",
                "time_datetime",
                "url_and_dateline",
                "url_date",
                "class_date",
                "text_date",
            ]
        );
    }

    #[test]
    fn test_every_heuristic_has_a_fixture() {
        assert!(registry().iter().all(|h| h.fixture.is_some()));
    }

    #[test]
    fn test_url_slash_date() {
        let story = story("http://example.com/2012/01/17/some-story.html");
        assert_eq!(extract("url_date", &story, "<html></html>"), Some(REFERENCE));
    }

    #[test]
    fn test_url_compact_date() {
        let story = story("http://example.com/story-20120117.html");
        assert_eq!(extract("url_date", &story, "<html></html>"), Some(REFERENCE));
    }

    #[test]
    fn test_url_date_outside_year_range_rejected() {
        let story = story("http://example.com/1997/01/17/archive.html");
        assert_eq!(extract("url_date", &story, "<html></html>"), None);
    }

    #[test]
    fn test_url_date_invalid_month_rejected() {
        let story = story("http://example.com/2012/13/17/story.html");
        assert_eq!(extract("url_date", &story, "<html></html>"), None);
    }

    #[test]
    fn test_url_date_prefers_redirect() {
        let mut s = story("http://example.com/2012/03/05/index.html");
        s.redirect_url = Some("http://example.com/2012/01/17/index.html".to_string());
        assert_eq!(extract("url_date", &s, "<html></html>"), Some(REFERENCE));
    }

    #[test]
    fn test_dateline_refines_url_date_when_same_day_and_later() {
        let story = story("http://example.com/2012/01/17/story.html");
        let html = r#"<p class="dateline">January 17, 2012, 2:30 PM EST</p>"#;
        // 2:30 PM EST is 2.5 hours past the URL's noon reading.
        assert_eq!(
            extract("url_and_dateline", &story, html),
            Some(REFERENCE + 9000)
        );
    }

    #[test]
    fn test_dateline_earlier_than_url_date_is_ignored() {
        let story = story("http://example.com/2012/01/17/story.html");
        let html = r#"<p class="dateline">January 17, 2012, 9:00 AM EST</p>"#;
        assert_eq!(extract("url_and_dateline", &story, html), Some(REFERENCE));
    }

    #[test]
    fn test_dateline_more_than_a_day_later_is_ignored() {
        let story = story("http://example.com/2012/01/17/story.html");
        let html = r#"<p class="dateline">January 19, 2012, 9:00 AM EST</p>"#;
        assert_eq!(extract("url_and_dateline", &story, html), Some(REFERENCE));
    }

    #[test]
    fn test_text_date_scan() {
        let story = story("http://example.com/no-date-here");
        let html = "<div>Filed <b>January 17, 2012</b> from the newsroom.</div>";
        assert_eq!(extract("text_date", &story, html), Some(REFERENCE));
    }

    #[test]
    fn test_text_date_scans_raw_markup() {
        // The scan runs over the markup as fetched, so a date that never
        // renders as element text still counts.
        let story = story("http://example.com/x");
        let html = r#"<div title="updated January 17, 2012"><p>No visible date.</p></div>"#;
        assert_eq!(extract("text_date", &story, html), Some(REFERENCE));
    }

    #[test]
    fn test_data_timestamp_rejects_non_numeric() {
        let story = story("http://example.com/x");
        let html = r#"<span data-unix-timestamp="around noon">x</span>"#;
        assert_eq!(extract("data_timestamp", &story, html), None);
    }
}
