//! The date-inference pipeline.
//!
//! Raw markup is indexed (`index`), an ordered chain of heuristics extracts
//! raw date signals (`heuristics`), every signal is converted to a canonical
//! UTC instant (`normalize`), and the reconciler decides whether the first
//! plausible instant may overwrite the recorded date (`reconcile`). A fixture
//! self-test (`selftest`) gates the whole pipeline at startup.

mod heuristics;
mod index;
mod normalize;
mod reconcile;
mod selftest;

pub use heuristics::{registry, ExtractCtx, Heuristic};
pub use index::IndexedHtml;
pub use normalize::{DateNormalizer, RawDate};
pub use reconcile::Reconciler;
pub use selftest::{SelfTestError, FIXTURE_URL, REFERENCE_INSTANT};
