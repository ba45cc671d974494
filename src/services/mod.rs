//! Service layer: domain logic separated from CLI concerns.

mod guess;

pub use guess::{GuessError, GuessRunner, GuessSummary};
