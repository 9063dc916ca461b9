use serde::Deserialize;
use uuid::Uuid;

/// City the crawl is bound to unless configured otherwise (Krasnodar)
pub const DEFAULT_CITY_UUID: &str = "4a70f9e0-46ae-11e7-83ff-00155d026416";

/// Main configuration structure for the catalog crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root of the web API; endpoint paths are appended to it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// City bound to the session before any catalog request
    #[serde(rename = "city-uuid", default = "default_city_uuid")]
    pub city_uuid: Uuid,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of products requested per listing page
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,

    /// Maximum listing pages fetched per category
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Minimum time between request starts (milliseconds)
    #[serde(rename = "download-delay", default = "default_download_delay")]
    pub download_delay: u64,

    /// Maximum number of requests in flight
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Retries for transient failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause before a retry (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Sent verbatim instead of the formatted identity when set
    #[serde(rename = "override", default)]
    pub override_value: Option<String>,
}

impl UserAgentConfig {
    /// Returns the User-Agent header value for outgoing requests
    pub fn header_value(&self) -> String {
        match &self.override_value {
            Some(value) => value.clone(),
            // Format: CrawlerName/Version (+ContactURL; ContactEmail)
            None => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
            ),
        }
    }
}

/// Seed list configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Line-oriented file of category URLs
    #[serde(rename = "seed-path", default = "default_seed_path")]
    pub seed_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the exported JSON feed
    #[serde(rename = "items-path", default = "default_items_path")]
    pub items_path: String,

    /// Write the feed even when no records were produced
    #[serde(rename = "store-empty", default)]
    pub store_empty: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            city_uuid: default_city_uuid(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            download_delay: default_download_delay(),
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            items_path: default_items_path(),
            store_empty: false,
        }
    }
}

fn default_base_url() -> String {
    "https://alkoteka.com/web-api/v1/".to_string()
}

fn default_city_uuid() -> Uuid {
    Uuid::parse_str(DEFAULT_CITY_UUID).unwrap_or_default()
}

fn default_per_page() -> u32 {
    4
}

fn default_max_pages() -> u32 {
    1
}

fn default_download_delay() -> u64 {
    2000
}

fn default_max_concurrent_requests() -> u32 {
    8
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_seed_path() -> String {
    "start_urls.txt".to_string()
}

fn default_items_path() -> String {
    "result.json".to_string()
}
