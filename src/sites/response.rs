//! Adapter for the retired paginated chronicle at response-hessen.de.
//!
//! A Drupal list view: one `article.node-chronicle` per incident, a
//! `li.pager-next` link for pagination and two exposed filter dimensions
//! (district and motivation) as `<select>` option lists.

use super::{
    option_filter_values, selector, FilterDimension, FilterTag, FilterValue, SiteAdapter,
};
use crate::error::{Error, Result};
use crate::extract::{
    parse_german_date, split_city_title, strip_source_label, Chronicle, ExtractContext,
    Extraction, Incident, SourceRef,
};
use scraper::{ElementRef, Html};
use url::Url;

const PROD_BASE: &str = "https://response-hessen.de";
const CHRONICLER_NAME: &str = "response.";

/// Paginated list-site adapter (extraction variant A).
pub struct ResponseChronik {
    base: Url,
}

impl ResponseChronik {
    pub fn new() -> Self {
        Self {
            base: Url::parse(PROD_BASE).expect("static base URL"),
        }
    }

    /// Same adapter pointed at a different host (used against test servers).
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    fn chronik_url(&self, query: &str) -> String {
        format!("{}chronik{}", self.base, query)
    }
}

impl Default for ResponseChronik {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for ResponseChronik {
    fn name(&self) -> &'static str {
        "response"
    }

    fn chronicle(&self) -> Chronicle {
        Chronicle {
            iso3166_1: "DE".to_string(),
            iso3166_2: "DE-HE".to_string(),
            chronicler_name: CHRONICLER_NAME.to_string(),
            chronicler_description: "response. ist die erste Beratungsstelle für Betroffene \
                rechter Gewalt in Hessen und in der Bildungsstätte Anne Frank in Frankfurt \
                angesiedelt."
                .to_string(),
            chronicler_url: self.chronik_url(""),
            chronicle_source: self.chronik_url(""),
        }
    }

    fn start_url(&self) -> String {
        self.chronik_url("")
    }

    fn fragments<'a>(&self, doc: &'a Html) -> Result<Vec<ElementRef<'a>>> {
        let articles = selector("article.node-chronicle")?;
        Ok(doc.select(&articles).collect())
    }

    fn next_page_url(&self, doc: &Html) -> Result<Option<String>> {
        let next = selector("li.pager-next a")?;
        let Some(href) = doc.select(&next).next().and_then(|a| a.value().attr("href")) else {
            return Ok(None);
        };
        Ok(Some(self.base.join(href)?.to_string()))
    }

    fn filter_dimensions(&self, doc: &Html) -> Result<Vec<FilterDimension>> {
        Ok(vec![
            FilterDimension {
                tag: FilterTag::County,
                values: option_filter_values(doc, "#edit-field-district-tid option")?,
            },
            FilterDimension {
                tag: FilterTag::Motives,
                values: option_filter_values(doc, "#edit-field-motivation-tid option")?,
            },
        ])
    }

    fn filtered_url(&self, tag: FilterTag, value: &FilterValue) -> Option<String> {
        let param = match tag {
            FilterTag::County => "field_district_tid",
            FilterTag::Motives => "field_motivation_tid",
        };
        Some(self.chronik_url(&format!("?{param}={}", value.id)))
    }

    fn extract(&self, fragment: ElementRef<'_>, ctx: &ExtractContext) -> Result<Option<Extraction>> {
        let date_sel = selector("span.date-display-single")?;
        let date_text = fragment
            .select(&date_sel)
            .next()
            .ok_or_else(|| Error::MalformedFragment("missing date element".to_string()))?
            .text()
            .collect::<String>();
        let date = parse_german_date(&date_text)?;

        // Drupal assigns each node a unique leading class token; it is the
        // only stable identifier the markup exposes.
        let class_token = fragment
            .value()
            .attr("class")
            .and_then(|c| c.split_whitespace().next())
            .ok_or_else(|| Error::MalformedFragment("fragment has no class token".to_string()))?;
        let rg_id = format!("response-{class_token}");

        let heading_sel = selector(".node__title.node-title")?;
        let heading = fragment
            .select(&heading_sel)
            .next()
            .ok_or_else(|| Error::MalformedFragment("missing heading element".to_string()))?
            .text()
            .collect::<String>();
        let (city, title) = split_city_title(heading.trim());

        let paragraph_sel = selector("p")?;
        let description = fragment
            .select(&paragraph_sel)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let source_sel = selector("div.field-name-field-source ul.item-list li")?;
        let link_sel = selector("a")?;
        let sources = fragment
            .select(&source_sel)
            .map(|item| SourceRef {
                rg_id: rg_id.clone(),
                name: strip_source_label(&item.text().collect::<String>()),
                url: item
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            })
            .collect();

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
