//! Output module for exporting crawl results
//!
//! This module handles:
//! - Streaming normalized records into the JSON feed
//! - Recording crawl statistics

mod json_feed;
pub mod stats;
mod traits;

pub use json_feed::JsonFeedWriter;
pub use stats::{print_statistics, Counter, CrawlStatistics, CrawlStats};
pub use traits::{MemoryOutput, OutputError, OutputHandler, OutputResult};
