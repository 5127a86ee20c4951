//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::store::{ChroniclerCounts, RecordStore};

/// Report stored record counts per chronicler.
pub async fn cmd_status(config: &Config) -> Result<Vec<ChroniclerCounts>> {
    let store = RecordStore::connect(config).await?;
    store.init_schema().await?;
    store.counts_by_chronicler().await
}

/// Print the status report for the operator.
pub fn print_status(counts: &[ChroniclerCounts]) {
    if counts.is_empty() {
        println!("No incidents stored yet. Run `chronik crawl` first.");
        return;
    }
    for row in counts {
        println!(
            "{}: {} incidents, {} sources",
            row.chronicler_name, row.incidents, row.sources
        );
    }
}
