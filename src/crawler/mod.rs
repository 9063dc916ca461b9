//! Crawler module for the catalog API
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching with throttling and retry logic
//! - City binding for the crawl session
//! - Category listing walks
//! - Product detail fetching
//! - Overall pipeline coordination

mod coordinator;
mod detail;
mod fetcher;
mod locality;
mod scheduler;
mod walker;

pub use coordinator::{run_crawl, Coordinator};
pub use detail::{build_record, fetch_details, parse_detail};
pub use fetcher::{body_preview, build_http_client, fetch_url, FetchResult, Fetcher};
pub use locality::initialize_locality;
pub use scheduler::{RequestPermit, Scheduler};
pub use walker::{load_seeds, parse_listing, walk_catalog, DetailRequest, ListingPage};

use crate::config::{Config, CrawlerConfig};
use crate::output::CrawlStats;
use crate::url::Locality;
use crate::CatalogError;
use std::sync::Arc;

/// State shared by every pipeline stage
///
/// Built once per run; nothing in it changes after construction except the
/// statistics counters.
#[derive(Debug)]
pub struct CrawlContext {
    pub fetcher: Fetcher,
    pub locality: Locality,
    pub crawler: CrawlerConfig,
    pub stats: Arc<CrawlStats>,
}

impl CrawlContext {
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
            locality: Locality::from_config(&config.site)?,
            crawler: config.crawler.clone(),
            stats: Arc::new(CrawlStats::new()),
        })
    }
}
