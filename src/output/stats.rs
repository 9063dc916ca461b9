//! Run statistics
//!
//! Counters are shared by every pipeline stage and read once at the end of
//! the run.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by the pipeline stages
#[derive(Debug, Default)]
pub struct CrawlStats {
    categories_requested: AtomicU64,
    listing_pages_fetched: AtomicU64,
    listing_failures: AtomicU64,
    empty_listings: AtomicU64,
    summaries_skipped: AtomicU64,
    details_requested: AtomicU64,
    detail_failures: AtomicU64,
    records_emitted: AtomicU64,
}

/// Counter names, used by [`CrawlStats::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    CategoriesRequested,
    ListingPagesFetched,
    ListingFailures,
    EmptyListings,
    SummariesSkipped,
    DetailsRequested,
    DetailFailures,
    RecordsEmitted,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments a counter by one
    pub fn record(&self, counter: Counter) {
        self.add(counter, 1);
    }

    /// Increments a counter by `n`
    pub fn add(&self, counter: Counter, n: u64) {
        self.counter(counter).fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::CategoriesRequested => &self.categories_requested,
            Counter::ListingPagesFetched => &self.listing_pages_fetched,
            Counter::ListingFailures => &self.listing_failures,
            Counter::EmptyListings => &self.empty_listings,
            Counter::SummariesSkipped => &self.summaries_skipped,
            Counter::DetailsRequested => &self.details_requested,
            Counter::DetailFailures => &self.detail_failures,
            Counter::RecordsEmitted => &self.records_emitted,
        }
    }

    /// Takes a point-in-time copy of the counters
    pub fn snapshot(&self, config_hash: Option<String>) -> CrawlStatistics {
        CrawlStatistics {
            config_hash,
            categories_requested: self.get(Counter::CategoriesRequested),
            listing_pages_fetched: self.get(Counter::ListingPagesFetched),
            listing_failures: self.get(Counter::ListingFailures),
            empty_listings: self.get(Counter::EmptyListings),
            summaries_skipped: self.get(Counter::SummariesSkipped),
            details_requested: self.get(Counter::DetailsRequested),
            detail_failures: self.get(Counter::DetailFailures),
            records_emitted: self.get(Counter::RecordsEmitted),
        }
    }
}

/// Final statistics of a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Fingerprint of the configuration the run used
    pub config_hash: Option<String>,
    pub categories_requested: u64,
    pub listing_pages_fetched: u64,
    pub listing_failures: u64,
    pub empty_listings: u64,
    pub summaries_skipped: u64,
    pub details_requested: u64,
    pub detail_failures: u64,
    pub records_emitted: u64,
}

impl CrawlStatistics {
    /// Share of requested details that became records, in percent
    pub fn success_rate(&self) -> f64 {
        if self.details_requested == 0 {
            return 0.0;
        }
        self.records_emitted as f64 / self.details_requested as f64 * 100.0
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===")?;
        if let Some(hash) = &self.config_hash {
            writeln!(f, "  Config hash: {}", hash)?;
        }
        writeln!(f, "  Categories requested: {}", self.categories_requested)?;
        writeln!(f, "  Listing pages fetched: {}", self.listing_pages_fetched)?;
        writeln!(f, "  Listing failures: {}", self.listing_failures)?;
        writeln!(f, "  Empty listings: {}", self.empty_listings)?;
        writeln!(f, "  Summaries skipped: {}", self.summaries_skipped)?;
        writeln!(f, "  Details requested: {}", self.details_requested)?;
        writeln!(f, "  Detail failures: {}", self.detail_failures)?;
        writeln!(
            f,
            "  Records emitted: {} ({:.2}%)",
            self.records_emitted,
            self.success_rate()
        )
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", stats);
}
