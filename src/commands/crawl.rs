//! Crawl command implementation

use crate::config::Config;
use crate::crawl::{CrawlDriver, CrawlStats};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::sites::{HessenSchautHin, ResponseChronik, SiteAdapter};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-site campaign results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub site: String,
    pub stats: CrawlStats,
}

fn adapter_for(site: &str) -> Result<Box<dyn SiteAdapter>> {
    match site {
        "response" => Ok(Box::new(ResponseChronik::new())),
        "hessenschauthin" => Ok(Box::new(HessenSchautHin::new())),
        other => Err(Error::UnknownSite(other.to_string())),
    }
}

/// Crawl every enabled site in configured order.
pub async fn cmd_crawl(config: &Config) -> Result<Vec<CampaignSummary>> {
    let store = RecordStore::connect(config).await?;
    store.init_schema().await?;
    let fetcher = Fetcher::new(&config.fetch)?;
    let driver = CrawlDriver::new(&fetcher, &store);

    let mut summaries = Vec::new();
    for site in &config.sites {
        let adapter = adapter_for(site)?;
        info!("Starting campaign for {}", adapter.name());
        let stats = driver.run_campaign(adapter.as_ref()).await?;
        summaries.push(CampaignSummary {
            site: adapter.name().to_string(),
            stats,
        });
    }
    Ok(summaries)
}

/// Print campaign results for the operator.
pub fn print_campaign_summary(summaries: &[CampaignSummary]) {
    for summary in summaries {
        let s = &summary.stats;
        println!(
            "{}: {} pages fetched, {} incidents, {} sources, {} fragments skipped, {} walks aborted",
            summary.site,
            s.pages_fetched,
            s.incidents_stored,
            s.sources_stored,
            s.fragments_skipped,
            s.walks_aborted
        );
    }
}
