//! Custom error types for chronik

use thiserror::Error;

/// Main error type for chronik operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),

    #[error("Unparseable date: {0:?}")]
    DateParse(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Unknown site: {0}")]
    UnknownSite(String),
}

impl Error {
    /// Whether this error invalidates a single fragment rather than a whole
    /// page or walk. The crawl driver logs these and moves on.
    pub fn is_fragment_error(&self) -> bool {
        matches!(self, Error::MalformedFragment(_) | Error::DateParse(_))
    }
}

/// Result type alias for chronik
pub type Result<T> = std::result::Result<T, Error>;
