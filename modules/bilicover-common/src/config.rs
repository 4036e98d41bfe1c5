use std::env;

use chrono::NaiveDate;
use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session cookie string from a logged-in browser session, attached
    /// verbatim to API requests. Without it, restricted comment sections
    /// come back thinned out or empty.
    pub cookie: Option<String>,

    /// Directory the CSV files are written into.
    pub output_dir: String,

    /// Label woven into output file names, normally the song being studied.
    pub song_label: String,

    // Candidate filtering
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub target_count: usize,

    // Comment harvesting
    pub comment_limit: usize,
    pub sort_mode: u8,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a value fails to parse.
    pub fn from_env() -> Self {
        Self {
            cookie: env::var("BILI_COOKIE").ok().filter(|c| !c.is_empty()),
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            song_label: env::var("SONG_LABEL").unwrap_or_else(|_| "cover_songs".to_string()),
            window_start: date_env("WINDOW_START", "2023-01-01"),
            window_end: date_env("WINDOW_END", "2025-10-01"),
            target_count: parsed_env("TARGET_COUNT", "10"),
            comment_limit: parsed_env("COMMENT_LIMIT", "5000"),
            sort_mode: parsed_env("SORT_MODE", "3"),
        }
    }

    /// Log the loaded configuration without exposing the credential.
    pub fn log_redacted(&self) {
        info!(
            cookie = if self.cookie.is_some() { "set" } else { "unset" },
            output_dir = %self.output_dir,
            song_label = %self.song_label,
            window_start = %self.window_start,
            window_end = %self.window_end,
            target_count = self.target_count,
            comment_limit = self.comment_limit,
            sort_mode = self.sort_mode,
            "Config loaded"
        );
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: &str) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a number"))
}

fn date_env(key: &str, default: &str) -> NaiveDate {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .unwrap_or_else(|_| panic!("{key} must be a YYYY-MM-DD date"))
}
