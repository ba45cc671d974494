//! Startup self-test for the extraction and normalization pipeline.
//!
//! Every heuristic that carries a fixture must reproduce one shared
//! reference instant through the full extract-then-normalize path. Any
//! mismatch is fatal: it signals a regression, and no document may be
//! processed past it.

use thiserror::Error;

use crate::models::Story;

use super::heuristics::{ExtractCtx, Heuristic};
use super::index::IndexedHtml;
use super::normalize::DateNormalizer;

/// 2012-01-17 17:00:00 UTC (2012-01-17T12:00:00-05:00), the instant every
/// fixture encodes.
pub const REFERENCE_INSTANT: i64 = 1_326_819_600;

/// URL assigned to the fixture story; carries the reference date for the
/// URL-pattern heuristics.
pub const FIXTURE_URL: &str = "http://www.example.com/news/2012/01/17/self-test-fixture.html";

/// A fixture failed to reproduce the reference instant.
#[derive(Debug, Error)]
#[error("self-test failed for heuristic `{heuristic}`: expected {expected}, got {actual}")]
pub struct SelfTestError {
    pub heuristic: &'static str,
    pub expected: i64,
    pub actual: String,
}

/// Exercise every fixture-carrying heuristic. Returns the count verified.
pub fn run(
    heuristics: &[Heuristic],
    normalizer: &DateNormalizer,
    year_range: (i32, i32),
) -> Result<usize, SelfTestError> {
    let story = Story {
        id: 0,
        url: FIXTURE_URL.to_string(),
        redirect_url: None,
        publish_date: None,
    };
    let mut verified = 0;
    for heuristic in heuristics {
        let Some(fixture) = heuristic.fixture else {
            continue;
        };
        let doc = IndexedHtml::parse(fixture);
        let ctx = ExtractCtx {
            story: &story,
            raw: fixture,
            doc: &doc,
            normalizer,
            year_range,
        };
        let instant = (heuristic.extract)(&ctx).and_then(|raw| normalizer.normalize(&raw));
        match instant {
            Some(dt) if dt.timestamp() == REFERENCE_INSTANT => verified += 1,
            Some(dt) => {
                return Err(SelfTestError {
                    heuristic: heuristic.name,
                    expected: REFERENCE_INSTANT,
                    actual: dt.timestamp().to_string(),
                })
            }
            None => {
                return Err(SelfTestError {
                    heuristic: heuristic.name,
                    expected: REFERENCE_INSTANT,
                    actual: "no extraction".to_string(),
                })
            }
        }
    }
    Ok(verified)
}
