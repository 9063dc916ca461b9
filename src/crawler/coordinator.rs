//! Crawler coordinator - main crawl orchestration logic
//!
//! The run is a linear pipeline of typed stages connected by channels:
//!
//! ```text
//! city binding -> walk_catalog -> [DetailRequest] -> fetch_details -> [ProductRecord] -> export
//! ```
//!
//! The city binding runs to completion before anything else starts; the
//! remaining stages run concurrently until the walker runs out of categories
//! and the channels drain.

use crate::config::Config;
use crate::crawler::detail::fetch_details;
use crate::crawler::locality::initialize_locality;
use crate::crawler::walker::{load_seeds, walk_catalog};
use crate::crawler::CrawlContext;
use crate::output::{Counter, CrawlStatistics, CrawlStats, JsonFeedWriter, OutputHandler};
use crate::CatalogError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the channels between pipeline stages
const CHANNEL_CAPACITY: usize = 256;

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    seed_path: PathBuf,
    output: Box<dyn OutputHandler>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator exporting to the configured JSON feed
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CatalogError)` - Failed to build the HTTP client or locality
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let output = JsonFeedWriter::new(&config.output.items_path, config.output.store_empty);
        Self::with_output(config, Box::new(output))
    }

    /// Creates a coordinator exporting to a custom sink
    pub fn with_output(config: Config, output: Box<dyn OutputHandler>) -> Result<Self, CatalogError> {
        let context = CrawlContext::from_config(&config)?;
        Ok(Self {
            context: Arc::new(context),
            seed_path: PathBuf::from(&config.input.seed_path),
            output,
            config_hash: None,
        })
    }

    /// Attaches the configuration fingerprint reported with the statistics
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Live counters of this run
    pub fn stats(&self) -> Arc<CrawlStats> {
        self.context.stats.clone()
    }

    /// Runs the crawl pipeline
    ///
    /// This method:
    /// 1. Binds the city; a failure here ends the run with an error
    /// 2. Loads the category seeds; a missing list ends the walk quietly
    /// 3. Walks categories, fetches details and exports records concurrently
    /// 4. Closes the output
    pub async fn run(&mut self) -> Result<CrawlStatistics, CatalogError> {
        initialize_locality(&self.context.fetcher, &self.context.locality).await?;

        let seeds = match load_seeds(&self.seed_path) {
            Ok(seeds) => seeds,
            Err(e) => {
                tracing::error!("Catalog walk aborted: {}", e);
                self.output.finish()?;
                return Ok(self.statistics());
            }
        };
        tracing::info!(
            "Loaded {} category seeds from {}",
            seeds.len(),
            self.seed_path.display()
        );

        let (detail_tx, detail_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (record_tx, mut record_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let walker = tokio::spawn(walk_catalog(self.context.clone(), seeds, detail_tx));
        let details = tokio::spawn(fetch_details(self.context.clone(), detail_rx, record_tx));

        let mut export_error = None;
        while let Some(record) = record_rx.recv().await {
            match self.output.write_record(&record) {
                Ok(()) => self.context.stats.record(Counter::RecordsEmitted),
                Err(e) => {
                    tracing::error!("Failed to export record {}: {}", record.url, e);
                    export_error = Some(e);
                    break;
                }
            }
        }
        // A closed record channel makes the detail stage cancel its fetches
        // and close the walker's channel in turn
        drop(record_rx);
        if export_error.is_some() {
            self.context.fetcher.shutdown();
        }

        walker
            .await
            .map_err(|e| CatalogError::Pipeline(format!("catalog walker: {}", e)))?;
        details
            .await
            .map_err(|e| CatalogError::Pipeline(format!("detail fetcher: {}", e)))?;

        if let Some(e) = export_error {
            if let Err(finish_error) = self.output.finish() {
                tracing::warn!("Could not close output after export failure: {}", finish_error);
            }
            return Err(e.into());
        }
        self.output.finish()?;

        let stats = self.statistics();
        tracing::info!(
            "Crawl completed: {} records from {} categories",
            stats.records_emitted,
            stats.categories_requested
        );
        Ok(stats)
    }

    fn statistics(&self) -> CrawlStatistics {
        self.context.stats.snapshot(self.config_hash.clone())
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use alkoteka_catalog::config::load_config;
/// use alkoteka_catalog::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(config, None).await?;
/// println!("{} records", stats.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: Option<String>,
) -> Result<CrawlStatistics, CatalogError> {
    let mut coordinator = Coordinator::new(config)?;
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }
    coordinator.run().await
}
