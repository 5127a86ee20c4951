//! Adapter for the single-page successor chronicle at hessenschauthin.de.
//!
//! The successor site lists every record on one page without pagination and
//! mixes its sources into the body as free-text "Quelle" blocks. It only
//! fills the gap left by the retirement of the response-hessen.de list, so
//! records dated before 2020-01-02 are discarded — that history is already
//! covered by the list-site adapter.

use super::{selector, SiteAdapter};
use crate::error::{Error, Result};
use crate::extract::{
    parse_german_date, split_city_title, strip_source_label, Chronicle, ExtractContext,
    Extraction, Incident, SourceRef,
};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Node};
use tracing::debug;
use url::Url;

const PROD_PAGE: &str = "https://hessenschauthin.de/chronik/";
const CHRONICLER_NAME: &str = "Hessen schaut hin";
const SOURCE_MARKER: &str = "Quelle";

/// Records older than this are covered by the retired list site.
fn cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 2).expect("static date")
}

/// Single-page site adapter (extraction variant B).
pub struct HessenSchautHin {
    page: Url,
}

impl HessenSchautHin {
    pub fn new() -> Self {
        Self {
            page: Url::parse(PROD_PAGE).expect("static page URL"),
        }
    }

    /// Same adapter pointed at a different host (used against test servers).
    pub fn with_page(page: Url) -> Self {
        Self { page }
    }
}

impl Default for HessenSchautHin {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for HessenSchautHin {
    fn name(&self) -> &'static str {
        "hessenschauthin"
    }

    fn chronicle(&self) -> Chronicle {
        Chronicle {
            iso3166_1: "DE".to_string(),
            iso3166_2: "DE-HE".to_string(),
            chronicler_name: CHRONICLER_NAME.to_string(),
            chronicler_description: "Hessen schaut hin ist das Melde- und Informationsportal \
                der Beratungsstelle response. und führt deren Chronik rechter Gewalt in Hessen \
                fort."
                .to_string(),
            chronicler_url: self.page.to_string(),
            chronicle_source: self.page.to_string(),
        }
    }

    fn start_url(&self) -> String {
        self.page.to_string()
    }

    fn fragments<'a>(&self, doc: &'a Html) -> Result<Vec<ElementRef<'a>>> {
        let articles = selector("article.chronik-eintrag")?;
        Ok(doc.select(&articles).collect())
    }

    fn next_page_url(&self, _doc: &Html) -> Result<Option<String>> {
        Ok(None)
    }

    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext) -> Result<Option<Extraction>> {
        let id = fragment
            .value()
            .attr("id")
            .ok_or_else(|| Error::MalformedFragment("fragment has no id attribute".to_string()))?;
        let rg_id = format!("hessenschauthin-{id}");

        let date_sel = selector("span.eintrag-datum")?;
        let date_text = fragment
            .select(&date_sel)
            .next()
            .ok_or_else(|| Error::MalformedFragment("missing date element".to_string()))?
            .text()
            .collect::<String>();
        let date = parse_german_date(&date_text)?;
        if date < cutoff() {
            debug!("Discarding {} dated {} (before cutoff)", rg_id, date);
            return Ok(None);
        }

        let heading_sel = selector("h2.eintrag-titel")?;
        let heading = fragment
            .select(&heading_sel)
            .next()
            .ok_or_else(|| Error::MalformedFragment("missing heading element".to_string()))?
            .text()
            .collect::<String>();
        let (city, title) = split_city_title(heading.trim());

        // Body blocks in document order: "Quelle" blocks become sources, the
        // rest concatenates into the description.
        let block_sel = selector("p")?;
        let mut description = String::new();
        let mut sources = Vec::new();
        for block in fragment.select(&block_sel) {
            let text = block.text().collect::<String>();
            if text.trim_start().starts_with(SOURCE_MARKER) {
                collect_sources(block, &rg_id, &mut sources);
            } else {
                description.push_str(text.trim());
            }
        }

        Ok(Some(Extraction {
            incident: Incident {
                rg_id,
                chronicler_name: CHRONICLER_NAME.to_string(),
                title,
                description,
                city,
                date,
                url: ctx.page_url.clone(),
                county: ctx.county.clone(),
                motives: ctx.motives.clone(),
            },
            sources,
        }))
    }
}

/// Convert the children of a free-text source block: plain text becomes a
/// name-only source, links carry a URL, and bare markers are skipped.
fn collect_sources(block: ElementRef<'_>, rg_id: &str, sources: &mut Vec<SourceRef>) {
    for child in block.children() {
        match child.value() {
            Node::Text(text) => {
                let name = strip_source_label(text);
                if name.is_empty() || name == SOURCE_MARKER {
                    continue;
                }
                sources.push(SourceRef {
                    rg_id: rg_id.to_string(),
                    name,
                    url: None,
                });
            }
            Node::Element(el) if el.name() == "a" => {
                let Some(link) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = link.text().collect::<String>().trim().to_string();
                if name.is_empty() {
                    continue;
                }
                sources.push(SourceRef {
                    rg_id: rg_id.to_string(),
                    name,
                    url: link.value().attr("href").map(str::to_string),
                });
            }
            _ => {}
        }
    }
}
