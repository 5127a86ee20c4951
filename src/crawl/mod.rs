//! Crawl driver: walks a site's listing pages and persists every record.
//!
//! A campaign runs three sequential phases. First the unfiltered walk from
//! the site's base listing URL, following "next" links until none remains.
//! Then one fresh walk per discovered filter value (county, then motive),
//! tagging every record with the filter's label. Single-page sites simply
//! report no next link and no filter dimensions, so the same loop fetches
//! them exactly once.
//!
//! Failure containment: a fetch error aborts only the current walk, a
//! malformed fragment only that fragment. Everything already stored stays
//! valid.

use crate::error::Result;
use crate::extract::ExtractContext;
use crate::fetch::Fetcher;
use crate::progress::add_walk_spinner;
use crate::sites::{FilterTag, SiteAdapter};
use crate::store::RecordStore;
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Counters accumulated over one campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_fetched: u32,
    pub incidents_stored: u32,
    pub sources_stored: u32,
    pub fragments_skipped: u32,
    pub walks_aborted: u32,
}

/// Label of one walk, for logs and the progress spinner.
fn walk_label(site: &str, tag: Option<(FilterTag, &str)>) -> String {
    match tag {
        None => format!("{site}: all records"),
        Some((FilterTag::County, label)) => format!("{site}: county {label}"),
        Some((FilterTag::Motives, label)) => format!("{site}: motive {label}"),
    }
}

fn context_for(tag: Option<(FilterTag, &str)>, page_url: &str) -> ExtractContext {
    match tag {
        None => ExtractContext::unfiltered(page_url),
        Some((FilterTag::County, label)) => ExtractContext::county(label),
        Some((FilterTag::Motives, label)) => ExtractContext::motive(label),
    }
}

/// Orchestrates fetch → extract → store for one site at a time.
pub struct CrawlDriver<'a> {
    fetcher: &'a Fetcher,
    store: &'a RecordStore,
}

impl<'a> CrawlDriver<'a> {
    pub fn new(fetcher: &'a Fetcher, store: &'a RecordStore) -> Self {
        Self { fetcher, store }
    }

    /// Run a full campaign against one site.
    pub async fn run_campaign(&self, adapter: &dyn SiteAdapter) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();

        self.store.upsert_chronicle(&adapter.chronicle()).await?;

        let start = adapter.start_url();
        let first = match self.fetcher.fetch(&start).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Aborting campaign for {}: {}", adapter.name(), e);
                stats.walks_aborted += 1;
                return Ok(stats);
            }
        };

        // Filter dimensions are read once, from the first listing page.
        let dimensions = adapter.filter_dimensions(&first)?;
        for dim in &dimensions {
            info!(
                "Discovered {} {:?} filter values: {:?}",
                dim.values.len(),
                dim.tag,
                dim.values.iter().map(|v| (&v.label, &v.id)).collect::<Vec<_>>()
            );
        }

        // Phase 1: the unfiltered walk. Must complete before any filtered
        // walk so the canonical URLs are in place.
        self.walk(adapter, first, start, None, &mut stats).await?;

        // Phase 2: one fresh walk per filter value.
        for dim in &dimensions {
            for value in &dim.values {
                let Some(url) = adapter.filtered_url(dim.tag, value) else {
                    continue;
                };
                let doc = match self.fetcher.fetch(&url).await {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!("Aborting filtered walk {}: {}", value.label, e);
                        stats.walks_aborted += 1;
                        continue;
                    }
                };
                self.walk(adapter, doc, url, Some((dim.tag, value.label.as_str())), &mut stats)
                    .await?;
            }
        }

        info!(
            "Campaign for {} done: {} pages, {} incidents, {} sources, {} fragments skipped, {} walks aborted",
            adapter.name(),
            stats.pages_fetched,
            stats.incidents_stored,
            stats.sources_stored,
            stats.fragments_skipped,
            stats.walks_aborted
        );
        Ok(stats)
    }

    /// Walk one pagination chain starting from an already-fetched page.
    async fn walk(
        &self,
        adapter: &dyn SiteAdapter,
        mut doc: Html,
        mut url: String,
        tag: Option<(FilterTag, &str)>,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        let label = walk_label(adapter.name(), tag);
        let spinner = add_walk_spinner(&label);

        loop {
            stats.pages_fetched += 1;
            spinner.inc(1);

            let ctx = context_for(tag, &url);
            self.process_page(adapter, &doc, &ctx, stats).await?;

            let Some(next) = adapter.next_page_url(&doc)? else {
                break;
            };
            doc = match self.fetcher.fetch(&next).await {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Aborting walk '{}' at {}: {}", label, next, e);
                    stats.walks_aborted += 1;
                    break;
                }
            };
            url = next;
        }

        spinner.finish_with_message(label);
        Ok(())
    }

    /// Extract and store every fragment on one page. Fragment-level errors
    /// are logged and skipped; store errors abort the campaign.
    async fn process_page(
        &self,
        adapter: &dyn SiteAdapter,
        doc: &Html,
        ctx: &ExtractContext,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        for fragment in adapter.fragments(doc)? {
            match adapter.extract(fragment, ctx) {
                Ok(Some(extraction)) => {
                    self.store.upsert_incident(&extraction.incident).await?;
                    stats.incidents_stored += 1;
                    for source in &extraction.sources {
                        if self.store.upsert_source(source).await? {
                            stats.sources_stored += 1;
                        }
                    }
                }
                Ok(None) => {
                    stats.fragments_skipped += 1;
                }
                Err(e) if e.is_fragment_error() => {
                    warn!("Skipping fragment: {}", e);
                    stats.fragments_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
