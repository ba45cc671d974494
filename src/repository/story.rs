//! Story repository for SQLite persistence.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::info;

use crate::models::Story;

use super::Result;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The scope identifier does not name a known source.
    #[error("unknown source: {0}")]
    ScopeNotFound(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Persistence seam for candidate stories.
///
/// The batch driver only depends on this trait; tests substitute an
/// in-memory implementation.
pub trait StoryStore {
    /// Fail with [`StoreError::ScopeNotFound`] unless `source_id` exists.
    fn resolve_scope(&self, source_id: &str) -> Result<()>;

    /// Candidate stories for a source, ascending id.
    fn list_candidates(&self, source_id: &str) -> Result<Vec<Story>>;

    /// Record a corrected publish date for one story.
    fn update_publish_date(&mut self, story_id: i64, date: &str) -> Result<()>;
}

/// SQLite-backed story repository.
pub struct SqliteStoryRepository {
    db_path: PathBuf,
}

impl SqliteStoryRepository {
    /// Open (or create) the database and ensure the schema exists.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sources (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id TEXT NOT NULL REFERENCES sources(id),
                url TEXT NOT NULL,
                redirect_url TEXT,
                publish_date TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_stories_source ON stories(source_id, id);
            "#,
        )?;
        Ok(())
    }

    /// Register a source, replacing the name if it already exists.
    pub fn add_source(&mut self, source_id: &str, name: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO sources (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![source_id, name],
        )?;
        info!(source_id, name, "registered source");
        Ok(())
    }

    pub fn list_sources(&self) -> Result<Vec<(String, String)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name FROM sources ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Insert a candidate story. Returns the new row id.
    pub fn add_story(
        &mut self,
        source_id: &str,
        url: &str,
        redirect_url: Option<&str>,
        publish_date: Option<&str>,
    ) -> Result<i64> {
        self.resolve_scope(source_id)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO stories (source_id, url, redirect_url, publish_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![source_id, url, redirect_url, publish_date],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn story_from_row(row: &Row) -> rusqlite::Result<Story> {
        Ok(Story {
            id: row.get(0)?,
            url: row.get(1)?,
            redirect_url: row.get(2)?,
            publish_date: row.get(3)?,
        })
    }
}

impl StoryStore for SqliteStoryRepository {
    fn resolve_scope(&self, source_id: &str) -> Result<()> {
        let conn = self.connect()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sources WHERE id = ?1",
                params![source_id],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::ScopeNotFound(source_id.to_string())),
        }
    }

    fn list_candidates(&self, source_id: &str) -> Result<Vec<Story>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, redirect_url, publish_date
             FROM stories WHERE source_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![source_id], Self::story_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn update_publish_date(&mut self, story_id: i64, date: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE stories SET publish_date = ?2 WHERE id = ?1",
            params![story_id, date],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_repo() -> (tempfile::TempDir, SqliteStoryRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteStoryRepository::new(&dir.path().join("test.db")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_resolve_scope_unknown_source() {
        let (_dir, repo) = temp_repo();
        match repo.resolve_scope("nope") {
            Err(StoreError::ScopeNotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("expected ScopeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_candidates_ordered_by_id() {
        let (_dir, mut repo) = temp_repo();
        repo.add_source("demo", "Demo Source").unwrap();
        repo.add_story("demo", "http://example.com/b", None, Some("2012-01-01"))
            .unwrap();
        repo.add_story("demo", "http://example.com/a", None, None)
            .unwrap();
        let stories = repo.list_candidates("demo").unwrap();
        assert_eq!(stories.len(), 2);
        assert!(stories[0].id < stories[1].id);
        assert_eq!(stories[0].url, "http://example.com/b");
    }

    #[test]
    fn test_update_publish_date() {
        let (_dir, mut repo) = temp_repo();
        repo.add_source("demo", "Demo Source").unwrap();
        let id = repo
            .add_story("demo", "http://example.com/a", None, None)
            .unwrap();
        repo.update_publish_date(id, "2012-01-17 17:00:00").unwrap();
        let stories = repo.list_candidates("demo").unwrap();
        assert_eq!(
            stories[0].publish_date.as_deref(),
            Some("2012-01-17 17:00:00")
        );
    }

    #[test]
    fn test_add_story_requires_known_source() {
        let (_dir, mut repo) = temp_repo();
        assert!(matches!(
            repo.add_story("ghost", "http://example.com/a", None, None),
            Err(StoreError::ScopeNotFound(_))
        ));
    }
}
