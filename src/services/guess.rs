//! Batch driver: run the inference pipeline over a source's candidates.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::dates::{Reconciler, SelfTestError};
use crate::fetch::Fetcher;
use crate::repository::{StoreError, StoryStore};

#[derive(Debug, Error)]
pub enum GuessError {
    #[error(transparent)]
    SelfTest(#[from] SelfTestError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts for one completed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessSummary {
    pub processed: usize,
    pub guessed: usize,
    pub fetch_failures: usize,
}

/// Drives one batch: self-test, scope resolution, then one sequential
/// inference pass per candidate story.
///
/// One report line per story goes to stdout in processing order:
/// `url <TAB> existing date <TAB> new date or "(no guess)"`.
pub struct GuessRunner<S, F> {
    store: S,
    fetcher: F,
    reconciler: Reconciler,
}

impl<S: StoryStore, F: Fetcher> GuessRunner<S, F> {
    pub fn new(store: S, fetcher: F, settings: &Settings) -> Self {
        Self {
            store,
            fetcher,
            reconciler: Reconciler::new(settings),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(
        &mut self,
        source_id: &str,
        limit: usize,
        dry_run: bool,
    ) -> Result<GuessSummary, GuessError> {
        // Correctness gate: a fixture regression aborts before any story.
        let verified = self.reconciler.self_test()?;
        debug!(fixtures = verified, "heuristic self-test passed");

        self.store.resolve_scope(source_id)?;
        let mut stories = self.store.list_candidates(source_id)?;
        if limit > 0 {
            stories.truncate(limit);
        }
        info!(source_id, count = stories.len(), "guessing publication dates");

        let mut summary = GuessSummary::default();
        for story in &stories {
            summary.processed += 1;
            let content = match self.fetcher.fetch(story.fetch_url()).await {
                Ok(content) => Some(content),
                Err(e) => {
                    warn!(
                        story_id = story.id,
                        url = story.fetch_url(),
                        error = %e,
                        "fetch failed, skipping story"
                    );
                    summary.fetch_failures += 1;
                    None
                }
            };
            let guess = content.and_then(|raw| self.reconciler.guess(story, &raw));
            let existing = story.publish_date.as_deref().unwrap_or("");
            match guess {
                Some((heuristic, instant)) => {
                    let stamp = instant.format("%Y-%m-%d %H:%M:%S").to_string();
                    if !dry_run {
                        self.store.update_publish_date(story.id, &stamp)?;
                    }
                    debug!(
                        story_id = story.id,
                        heuristic,
                        new_date = %stamp,
                        "publish date corrected"
                    );
                    println!("{}\t{}\t{}", story.url, existing, stamp);
                    summary.guessed += 1;
                }
                None => {
                    println!("{}\t{}\t(no guess)", story.url, existing);
                }
            }
        }

        info!(
            processed = summary.processed,
            guessed = summary.guessed,
            fetch_failures = summary.fetch_failures,
            "batch complete"
        );
        Ok(summary)
    }
}
