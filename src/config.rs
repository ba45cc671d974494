//! Configuration management for datesleuth.
//!
//! Defaults cover the normal case; an optional TOML file overrides any
//! subset of fields.

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

/// Default soft threshold in days.
pub const DEFAULT_SOFT_DATE_THRESHOLD_DAYS: i64 = 14;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum forward drift (days) between a guess and the existing date
    /// before the guess is distrusted.
    pub soft_date_threshold_days: i64,
    /// Inclusive lower sanity bound for URL-extracted years.
    pub valid_year_min: i32,
    /// Inclusive upper sanity bound for URL-extracted years.
    pub valid_year_max: i32,
    /// Zone applied to date text that carries no explicit offset.
    pub default_timezone: Tz,
    /// Per-request HTTP timeout.
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// SQLite database holding sources and stories.
    pub database_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            soft_date_threshold_days: DEFAULT_SOFT_DATE_THRESHOLD_DAYS,
            valid_year_min: 2000,
            valid_year_max: 2020,
            default_timezone: chrono_tz::America::New_York,
            http_timeout_secs: 30,
            user_agent: format!("datesleuth/{}", env!("CARGO_PKG_VERSION")),
            database_path: PathBuf::from("datesleuth.db"),
        }
    }
}

/// Load settings, overlaying a TOML file over the defaults when given.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(toml::from_str(&text)?)
        }
        None => Ok(Settings::default()),
    }
}
