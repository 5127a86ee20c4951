//! Site adapters for the supported chronicle sites.
//!
//! Each adapter knows one site's markup: how to enumerate incident fragments
//! on a page, how to find the next listing page, which filter dimensions the
//! site offers, and how to extract one fragment into the canonical schema.

mod hessenschauthin;
mod response;

pub use hessenschauthin::HessenSchautHin;
pub use response::ResponseChronik;

use crate::error::{Error, Result};
use crate::extract::{Chronicle, ExtractContext, Extraction};
use scraper::{ElementRef, Html, Selector};

/// One selectable value of a filter dimension: human-readable label plus the
/// opaque identifier the site expects in the filtered listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterValue {
    pub label: String,
    pub id: String,
}

/// Which incident column a filter dimension's label lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTag {
    County,
    Motives,
}

/// An axis by which the site can re-list the same records restricted to a value.
#[derive(Debug, Clone)]
pub struct FilterDimension {
    pub tag: FilterTag,
    pub values: Vec<FilterValue>,
}

/// A chronicle site, selected once at campaign setup.
pub trait SiteAdapter {
    /// Short identifier used in logs and the `sites` config list.
    fn name(&self) -> &'static str;

    /// Static reference row written at campaign start.
    fn chronicle(&self) -> Chronicle;

    /// First listing page of the unfiltered walk.
    fn start_url(&self) -> String;

    /// All incident fragments on a page, in document order.
    fn fragments<'a>(&self, doc: &'a Html) -> Result<Vec<ElementRef<'a>>>;

    /// Absolute URL of the next listing page, if the page has one.
    fn next_page_url(&self, doc: &Html) -> Result<Option<String>>;

    /// Filter dimensions offered by the site, read from the listing page.
    /// Single-page sites offer none.
    fn filter_dimensions(&self, _doc: &Html) -> Result<Vec<FilterDimension>> {
        Ok(Vec::new())
    }

    /// Listing URL restricted to one filter value, if the site supports the
    /// dimension.
    fn filtered_url(&self, _tag: FilterTag, _value: &FilterValue) -> Option<String> {
        None
    }

    /// Extract one fragment. `Ok(None)` means the fragment was deliberately
    /// discarded (e.g. dated before the site's cutoff).
    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext) -> Result<Option<Extraction>>;
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{css}: {e}")))
}

/// Read a `<select>` option list into filter values, skipping the leading
/// "- Any -" placeholder option.
pub(crate) fn option_filter_values(doc: &Html, css: &str) -> Result<Vec<FilterValue>> {
    let options = selector(css)?;
    Ok(doc
        .select(&options)
        .skip(1)
        .filter_map(|opt| {
            let id = opt.value().attr("value")?.to_string();
            let label = opt.text().collect::<String>().trim().to_string();
            Some(FilterValue { label, id })
        })
        .collect())
}
