//! Story models for publication date inference.

use serde::{Deserialize, Serialize};

/// A candidate story whose recorded publication date may need correcting.
///
/// Immutable for the duration of one inference run; the only write-back is a
/// single publish date update on acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Database row ID.
    pub id: i64,
    /// Canonical URL the story was collected from.
    pub url: String,
    /// Post-redirect URL, when the fetch followed one.
    pub redirect_url: Option<String>,
    /// Currently recorded publish date, as stored (raw text or epoch seconds).
    pub publish_date: Option<String>,
}

impl Story {
    /// URL to fetch content from. The redirect URL, when present, points at
    /// the page that actually served the content and is preferred.
    pub fn fetch_url(&self) -> &str {
        self.redirect_url.as_deref().unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_url_prefers_redirect() {
        let story = Story {
            id: 1,
            url: "http://example.com/a".to_string(),
            redirect_url: Some("http://example.com/b".to_string()),
            publish_date: None,
        };
        assert_eq!(story.fetch_url(), "http://example.com/b");
    }

    #[test]
    fn test_fetch_url_without_redirect() {
        let story = Story {
            id: 1,
            url: "http://example.com/a".to_string(),
            redirect_url: None,
            publish_date: None,
        };
        assert_eq!(story.fetch_url(), "http://example.com/a");
    }
}
