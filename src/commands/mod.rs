//! Subcommand implementations

mod crawl;
mod status;

pub use crawl::{cmd_crawl, print_campaign_summary, CampaignSummary};
pub use status::{cmd_status, print_status};
