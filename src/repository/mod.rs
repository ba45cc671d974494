//! Repository layer for SQLite persistence.

mod story;

pub use story::{SqliteStoryRepository, StoreError, StoryStore};

pub type Result<T> = std::result::Result<T, StoreError>;
