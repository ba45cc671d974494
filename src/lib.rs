//! datesleuth - publication date inference for archived web stories.
//!
//! Given a collection of candidate stories (URL, optional redirect URL, and
//! a possibly unreliable recorded publish date), datesleuth re-fetches each
//! page and runs an ordered chain of extraction heuristics over the markup
//! and URL text. Extracted signals are normalized to canonical UTC instants
//! and reconciled against the recorded date; the first plausible guess
//! replaces it.

pub mod cli;
pub mod config;
pub mod dates;
pub mod fetch;
pub mod models;
pub mod repository;
pub mod services;
