//! Default values for configuration

use std::path::PathBuf;

/// Default SQLite database path (relative to the working directory)
pub fn default_db_path() -> PathBuf {
    PathBuf::from("data.sqlite")
}

/// Default set of enabled sites, crawled in order
pub fn default_sites() -> Vec<String> {
    vec!["response".to_string(), "hessenschauthin".to_string()]
}

/// Default user agent sent with every request
pub fn default_user_agent() -> String {
    "chronik/0.1 (chronicle harvester)".to_string()
}

/// Default per-request timeout in seconds
pub fn default_timeout_secs() -> u64 {
    30
}

/// Default maximum fetch attempts per URL (first try included)
pub fn default_max_attempts() -> u32 {
    8
}

/// Default backoff before the first retry
pub fn default_initial_backoff_ms() -> u64 {
    1_000
}

/// Default backoff ceiling (128s, matching the historic scraper)
pub fn default_max_backoff_ms() -> u64 {
    128_000
}
