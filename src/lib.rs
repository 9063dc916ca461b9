//! Alkoteka catalog crawler
//!
//! This crate walks the public product API of a single liquor retailer:
//! it binds a city to the crawl session, pages through category listings,
//! fetches per-product detail and normalizes each listing/detail pair into a
//! flat record suitable for JSON export.

pub mod config;
pub mod crawler;
pub mod normalize;
pub mod output;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catalog crawl operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("City binding rejected with status {status}: {body}")]
    LocalityRejected { status: u16, body: String },

    #[error("City binding request to {url} failed: {error}")]
    LocalityUnreachable { url: String, error: String },

    #[error("Seed list not found at {}", .path.display())]
    SeedsMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("Unexpected payload from {url}: {message}")]
    Payload { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid endpoint base URL: {0}")]
    InvalidBase(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Pipeline stage failed: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for catalog crawl operations
pub type Result<T> = std::result::Result<T, CatalogError>;

// Re-export commonly used types
pub use config::Config;
pub use normalize::{normalize_product, ProductDetail, ProductRecord, ProductSummary};
pub use crate::url::{CategorySeed, Locality};
