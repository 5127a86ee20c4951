//! chronik: incremental harvester for the Hessen right-wing violence chronicles.
//!
//! The pipeline walks the paginated chronicle of response-hessen.de (plus one
//! re-walk per county and motive filter value) and the single-page successor
//! chronicle at hessenschauthin.de, extracts every incident fragment into a
//! common schema and upserts the records into a local SQLite store.

pub mod commands;
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod sites;
pub mod store;
