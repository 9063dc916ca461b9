//! Throttled GET requests against the catalog API
//!
//! Every request waits for a [`Scheduler`] permit. Gateway errors and
//! dropped connections are retried a bounded number of times before the
//! outcome is handed back to the caller as a [`FetchResult`].

use crate::config::{Config, CrawlerConfig, UserAgentConfig};
use crate::crawler::scheduler::Scheduler;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Status codes worth another attempt
const RETRY_STATUS_CODES: [u16; 8] = [500, 502, 503, 504, 522, 524, 408, 429];

/// Longest body excerpt kept for error reporting
const BODY_PREVIEW_CHARS: usize = 200;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource (2xx)
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Start of the response body
        body: String,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether another attempt may succeed
        transient: bool,
    },
}

impl FetchResult {
    /// Returns true if the request should be attempted again
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchResult::Success { .. } => false,
            FetchResult::HttpError { status_code, .. } => {
                RETRY_STATUS_CODES.contains(status_code)
            }
            FetchResult::NetworkError { transient, .. } => *transient,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client keeps a cookie store so anything the city binding sets on the
/// session travels with later requests.
///
/// # Example
///
/// ```no_run
/// use alkoteka_catalog::config::{CrawlerConfig, UserAgentConfig};
/// use alkoteka_catalog::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "CatalogBot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
///     override_value: None,
/// };
///
/// let client = build_http_client(&CrawlerConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches URLs through the scheduler, retrying transient failures
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    scheduler: Arc<Scheduler>,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Builds a fetcher, its client and its scheduler from the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.crawler, &config.user_agent)?;
        let scheduler = Arc::new(Scheduler::new(&config.crawler));
        Ok(Self::with_client(client, scheduler, &config.crawler))
    }

    pub fn with_client(client: Client, scheduler: Arc<Scheduler>, crawler: &CrawlerConfig) -> Self {
        Self {
            client,
            scheduler,
            max_retries: crawler.max_retries,
            retry_delay: Duration::from_millis(crawler.retry_delay),
        }
    }

    /// Refuses any request not yet started; later fetches fail without a network call
    pub fn shutdown(&self) {
        self.scheduler.close();
    }

    /// Fetches a URL with retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Success |
    /// | HTTP 408, 429, 5xx gateway errors | Retry up to `max-retries` times |
    /// | Timeout / connection error | Retry up to `max-retries` times |
    /// | Any other status | Immediate → HttpError |
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let mut attempt = 0;
        loop {
            let result = match self.scheduler.acquire().await {
                Some(_permit) => fetch_url(&self.client, url).await,
                None => {
                    return FetchResult::NetworkError {
                        error: "Scheduler closed".to_string(),
                        transient: false,
                    }
                }
            };

            if attempt >= self.max_retries || !result.is_retryable() {
                return result;
            }

            attempt += 1;
            tracing::warn!(
                "Retrying {} (attempt {}/{}): {}",
                url,
                attempt,
                self.max_retries,
                describe(&result)
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

/// Sends a single GET request and classifies the outcome
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    tracing::debug!("GET {}", url);

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    match response.text().await {
        Ok(body) if status.is_success() => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Ok(body) => FetchResult::HttpError {
            status_code: status.as_u16(),
            body: body_preview(&body),
        },
        Err(e) if status == StatusCode::OK => classify_error(e),
        Err(_) => FetchResult::HttpError {
            status_code: status.as_u16(),
            body: String::new(),
        },
    }
}

/// Returns the first characters of a body, for logs and error messages
pub fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            transient: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            transient: true,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            transient: false,
        }
    }
}

fn describe(result: &FetchResult) -> String {
    match result {
        FetchResult::Success { status_code, .. } => format!("HTTP {}", status_code),
        FetchResult::HttpError { status_code, .. } => format!("HTTP {}", status_code),
        FetchResult::NetworkError { error, .. } => error.clone(),
    }
}
