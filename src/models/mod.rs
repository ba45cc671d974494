//! Data models for datesleuth.

mod story;

pub use story::Story;
