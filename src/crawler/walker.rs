//! Catalog walker
//!
//! Turns category seeds into listing requests and listing responses into
//! detail requests. Each category is walked by its own task; a failure in
//! one category never affects the others.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::FetchResult;
use crate::crawler::CrawlContext;
use crate::normalize::{ListingEnvelope, ProductSummary};
use crate::output::Counter;
use crate::url::{category_listing_url, parse_seed_list, product_detail_url, CategorySeed, Locality};
use crate::CatalogError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

/// A product detail fetch, carrying its listing entry as context
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRequest {
    /// Detail endpoint for the product
    pub url: Url,

    /// The listing entry the request was derived from
    pub summary: ProductSummary,
}

/// Outcome of parsing one listing page
#[derive(Debug, Default)]
pub struct ListingPage {
    /// One request per entry with a usable slug, in listing order
    pub detail_requests: Vec<DetailRequest>,

    /// Number of entries in the page, valid or not
    pub entries: usize,

    /// Entries dropped for lack of a usable slug
    pub skipped: usize,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Whether another page should be requested after page `page`
    pub fn has_next_page(&self, page: u32, crawler: &CrawlerConfig) -> bool {
        page < crawler.max_pages && self.entries >= crawler.per_page as usize
    }
}

/// Reads the category seed list
///
/// # Returns
///
/// * `Ok(Vec<CategorySeed>)` - Seeds for every non-blank line with a slug
/// * `Err(CatalogError::SeedsMissing)` - The file does not exist
/// * `Err(CatalogError::Io)` - The file exists but could not be read
pub fn load_seeds(path: &Path) -> Result<Vec<CategorySeed>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::SeedsMissing {
                path: path.to_path_buf(),
                source,
            }
        } else {
            CatalogError::Io(source)
        }
    })?;
    Ok(parse_seed_list(&content))
}

/// Parses a category listing response
///
/// Only entries without a usable slug are skipped, with a warning. Other
/// fields never cause a skip: mistyped values decode to their defaults.
///
/// # Returns
///
/// * `Ok(ListingPage)` - Detail requests for every valid entry
/// * `Err(CatalogError::Json)` - The body is not a listing payload
pub fn parse_listing(body: &str, url: &str, locality: &Locality) -> Result<ListingPage, CatalogError> {
    let envelope: ListingEnvelope =
        serde_json::from_str(body).map_err(|source| CatalogError::Json {
            url: url.to_string(),
            source,
        })?;

    let mut page = ListingPage {
        entries: envelope.results.len(),
        ..ListingPage::default()
    };

    for entry in envelope.results {
        let name = entry
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("<unnamed>")
            .to_string();

        // Only a non-object entry fails here, and it has no slug either
        let summary: ProductSummary = serde_json::from_value(entry).unwrap_or_default();

        let Some(slug) = summary.usable_slug() else {
            tracing::warn!("No slug found for product: {}", name);
            page.skipped += 1;
            continue;
        };

        let url = product_detail_url(locality, slug);
        page.detail_requests.push(DetailRequest { url, summary });
    }

    Ok(page)
}

/// Walks every category and forwards detail requests downstream
///
/// Returns once every category task has finished; dropping the last sender
/// closes the detail stage's input.
pub async fn walk_catalog(
    context: Arc<CrawlContext>,
    seeds: Vec<CategorySeed>,
    detail_tx: mpsc::Sender<DetailRequest>,
) {
    let mut tasks = JoinSet::new();

    for seed in seeds {
        let context = context.clone();
        let detail_tx = detail_tx.clone();
        tasks.spawn(async move { walk_category(&context, seed, &detail_tx).await });
    }
    drop(detail_tx);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Category task failed: {}", e);
        }
    }
}

/// Walks the listing pages of one category
async fn walk_category(
    context: &CrawlContext,
    seed: CategorySeed,
    detail_tx: &mpsc::Sender<DetailRequest>,
) {
    context.stats.record(Counter::CategoriesRequested);
    tracing::debug!("Category seed {} -> slug {}", seed.url, seed.slug);

    for page_no in 1..=context.crawler.max_pages {
        if detail_tx.is_closed() {
            tracing::debug!("Detail stage closed, abandoning category {}", seed.slug);
            return;
        }
        let url = category_listing_url(
            &context.locality,
            &seed.slug,
            page_no,
            context.crawler.per_page,
        );
        tracing::info!("Fetching products from category: {}", url);

        let body = match context.fetcher.fetch(&url).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::HttpError { status_code, .. } => {
                tracing::error!("Category listing {} returned HTTP {}", url, status_code);
                context.stats.record(Counter::ListingFailures);
                return;
            }
            FetchResult::NetworkError { error, .. } => {
                tracing::error!("Category listing {} failed: {}", url, error);
                context.stats.record(Counter::ListingFailures);
                return;
            }
        };
        context.stats.record(Counter::ListingPagesFetched);

        let page = match parse_listing(&body, url.as_str(), &context.locality) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("{}", e);
                context.stats.record(Counter::ListingFailures);
                return;
            }
        };

        if page.is_empty() {
            tracing::info!("No products found in category listing {}", url);
            context.stats.record(Counter::EmptyListings);
            return;
        }

        context
            .stats
            .add(Counter::SummariesSkipped, page.skipped as u64);
        let more = page.has_next_page(page_no, &context.crawler);

        for request in page.detail_requests {
            context.stats.record(Counter::DetailsRequested);
            if detail_tx.send(request).await.is_err() {
                tracing::warn!("Detail stage closed, abandoning category {}", seed.slug);
                return;
            }
        }

        if !more {
            return;
        }
    }
}
