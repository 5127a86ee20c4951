//! Canonical record schema and extraction helpers shared by all site adapters.

mod date;

pub use date::parse_german_date;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One harvested incident record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Stable, site-prefixed record identifier (e.g. `response-node-1234`)
    pub rg_id: String,
    pub chronicler_name: String,
    pub title: String,
    pub description: String,
    pub city: Option<String>,
    pub date: NaiveDate,
    /// Canonical page URL; absent on filtered crawl passes
    pub url: Option<String>,
    /// County label, set only on county-filtered passes
    pub county: Option<String>,
    /// Motive label, set only on motive-filtered passes
    pub motives: Option<String>,
}

/// A reference cited by an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub rg_id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Static reference row describing one contributing chronicle site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chronicle {
    pub iso3166_1: String,
    pub iso3166_2: String,
    pub chronicler_name: String,
    pub chronicler_description: String,
    pub chronicler_url: String,
    pub chronicle_source: String,
}

/// The result of extracting one fragment.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub incident: Incident,
    pub sources: Vec<SourceRef>,
}

/// Ambient crawl metadata threaded alongside each fragment.
///
/// Exactly one of the three fields is set per walk: the page URL on the
/// unfiltered walk, or the active filter label on a filtered walk.
#[derive(Debug, Clone, Default)]
pub struct ExtractContext {
    pub page_url: Option<String>,
    pub county: Option<String>,
    pub motives: Option<String>,
}

impl ExtractContext {
    /// Context for the unfiltered walk; the listing page URL becomes the
    /// record's canonical URL.
    pub fn unfiltered(page_url: &str) -> Self {
        Self {
            page_url: Some(page_url.to_string()),
            ..Self::default()
        }
    }

    pub fn county(label: &str) -> Self {
        Self {
            county: Some(label.to_string()),
            ..Self::default()
        }
    }

    pub fn motive(label: &str) -> Self {
        Self {
            motives: Some(label.to_string()),
            ..Self::default()
        }
    }
}

/// Split a compound "City: Title" heading on the first colon. Headings
/// without a colon carry no city.
pub fn split_city_title(heading: &str) -> (Option<String>, String) {
    match heading.split_once(':') {
        Some((city, title)) => (Some(city.trim().to_string()), title.trim().to_string()),
        None => (None, heading.trim().to_string()),
    }
}

/// Strip the literal "Quelle:" label from a source name.
pub fn strip_source_label(text: &str) -> String {
    text.replace("Quelle:", "").trim().to_string()
}
