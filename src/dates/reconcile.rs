//! Chain execution and the soft-threshold acceptance policy.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::Settings;
use crate::models::Story;

use super::heuristics::{registry, ExtractCtx, Heuristic};
use super::index::IndexedHtml;
use super::normalize::{DateNormalizer, RawDate};
use super::selftest::{self, SelfTestError};

/// Runs the heuristic chain over one story and decides whether a guess is
/// trustworthy enough to overwrite the existing date.
pub struct Reconciler {
    normalizer: DateNormalizer,
    heuristics: Vec<Heuristic>,
    threshold_days: i64,
    year_range: (i32, i32),
}

impl Reconciler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            normalizer: DateNormalizer::new(settings.default_timezone),
            heuristics: registry(),
            threshold_days: settings.soft_date_threshold_days,
            year_range: (settings.valid_year_min, settings.valid_year_max),
        }
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    pub fn heuristic_count(&self) -> usize {
        self.heuristics.len()
    }

    /// Verify every fixture against the reference instant. Must pass before
    /// any story is processed.
    pub fn self_test(&self) -> Result<usize, SelfTestError> {
        selftest::run(&self.heuristics, &self.normalizer, self.year_range)
    }

    /// One-sided acceptance test.
    ///
    /// A guess is rejected only when it lands more than the soft threshold
    /// *later* than the existing date; arbitrarily early guesses pass. An
    /// underestimated date is a safer correction than an overestimated one.
    /// Without a usable existing date there is nothing to contradict.
    pub fn accepts(&self, existing: Option<DateTime<Utc>>, guess: DateTime<Utc>) -> bool {
        match existing {
            None => true,
            Some(existing) => {
                guess.timestamp() - existing.timestamp() < self.threshold_days * 86_400
            }
        }
    }

    /// Run the chain over one story's markup.
    ///
    /// Heuristics are tried in registry order; the first normalized instant
    /// that passes [`Reconciler::accepts`] wins and stops the chain. Returns
    /// the winning heuristic's name alongside the instant.
    pub fn guess(&self, story: &Story, raw: &str) -> Option<(&'static str, DateTime<Utc>)> {
        let doc = IndexedHtml::parse(raw);
        let existing = story
            .publish_date
            .as_deref()
            .and_then(RawDate::from_extracted)
            .and_then(|r| self.normalizer.normalize(&r));
        let ctx = ExtractCtx {
            story,
            raw,
            doc: &doc,
            normalizer: &self.normalizer,
            year_range: self.year_range,
        };
        for heuristic in &self.heuristics {
            let Some(value) = (heuristic.extract)(&ctx) else {
                continue;
            };
            let Some(instant) = self.normalizer.normalize(&value) else {
                continue;
            };
            if self.accepts(existing, instant) {
                debug!(
                    heuristic = heuristic.name,
                    story_id = story.id,
                    instant = instant.timestamp(),
                    "accepted date guess"
                );
                return Some((heuristic.name, instant));
            }
            debug!(
                heuristic = heuristic.name,
                story_id = story.id,
                "guess rejected by soft threshold"
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const REFERENCE: i64 = 1_326_819_600;

    fn reconciler() -> Reconciler {
        Reconciler::new(&Settings::default())
    }

    fn story(url: &str, publish_date: Option<&str>) -> Story {
        Story {
            id: 1,
            url: url.to_string(),
            redirect_url: None,
            publish_date: publish_date.map(str::to_string),
        }
    }

    fn utc(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_accepts_arbitrarily_early_guess() {
        // Deliberate asymmetry: the threshold only vetoes forward drift.
        let r = reconciler();
        let existing = utc(REFERENCE);
        assert!(r.accepts(Some(existing), existing - Duration::days(4000)));
        assert!(r.accepts(Some(existing), existing));
    }

    #[test]
    fn test_accepts_small_forward_drift() {
        let r = reconciler();
        let existing = utc(REFERENCE);
        assert!(r.accepts(Some(existing), existing + Duration::days(13)));
    }

    #[test]
    fn test_rejects_forward_drift_at_threshold() {
        // Strict comparison: exactly 14 days is already too far.
        let r = reconciler();
        let existing = utc(REFERENCE);
        assert!(!r.accepts(Some(existing), existing + Duration::days(14)));
        assert!(!r.accepts(Some(existing), existing + Duration::days(300)));
    }

    #[test]
    fn test_accepts_when_existing_date_is_absent() {
        let r = reconciler();
        assert!(r.accepts(None, utc(REFERENCE)));
    }

    #[test]
    fn test_priority_higher_heuristic_wins() {
        let r = reconciler();
        // Both the DC meta tag (priority 1) and a .date element (priority 9)
        // are present; the meta tag's instant must be returned.
        let html = r#"
            <meta name="DC.date.issued" content="2012-01-17T12:00:00-05:00"/>
            <p class="date">Jan 20, 2012</p>
        "#;
        let s = story("http://example.com/story.html", Some("2012-01-20"));
        let (name, instant) = r.guess(&s, html).unwrap();
        assert_eq!(name, "dc_date_issued");
        assert_eq!(instant.timestamp(), REFERENCE);
    }

    #[test]
    fn test_rejected_guess_falls_through_to_weaker_heuristic() {
        let r = reconciler();
        // The meta tag is months past the existing date and gets vetoed; the
        // .date element matches the existing date and is accepted.
        let html = r#"
            <meta name="DC.date.issued" content="2012-06-01T12:00:00-05:00"/>
            <p class="date">Jan 17, 2012</p>
        "#;
        let s = story("http://example.com/story.html", Some("2012-01-17"));
        let (name, instant) = r.guess(&s, html).unwrap();
        assert_eq!(name, "class_date");
        assert_eq!(instant.timestamp(), REFERENCE);
    }

    #[test]
    fn test_no_signal_yields_no_guess() {
        let r = reconciler();
        let s = story("http://example.com/about-us.html", Some("2012-01-17"));
        assert!(r
            .guess(&s, "<html><body><p>Contact our staff.</p></body></html>")
            .is_none());
    }

    #[test]
    fn test_existing_date_as_epoch_seconds() {
        let r = reconciler();
        // Existing date stored as raw epoch text; a guess far in the future
        // of it must be rejected even though the markup signal is strong.
        let html = r#"<meta name="DC.date.issued" content="2012-06-01T12:00:00-05:00"/>"#;
        let s = story("http://example.com/x", Some("1326819600"));
        assert!(r.guess(&s, html).is_none());
    }

    #[test]
    fn test_dc_meta_scenario() {
        // The guess is earlier than the recorded date, so the one-sided
        // threshold cannot veto it.
        let r = reconciler();
        let html = r#"<meta name="DC.date.issued" content="2012-01-17T12:00:00-05:00"/>"#;
        let s = story("http://example.com/x", Some("2012-01-30"));
        let (_, instant) = r.guess(&s, html).unwrap();
        assert_eq!(instant.timestamp(), REFERENCE);
    }
}
