//! Detail fetcher
//!
//! Fetches the detail payload for each product the walker found and hands
//! the normalized record to the export stage.

use crate::crawler::fetcher::FetchResult;
use crate::crawler::walker::DetailRequest;
use crate::crawler::CrawlContext;
use crate::normalize::{normalize_product, DetailEnvelope, ProductDetail, ProductRecord};
use crate::output::Counter;
use crate::CatalogError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Parses a product detail response body
///
/// # Returns
///
/// * `Ok(ProductDetail)` - The `results` object of the response
/// * `Err(CatalogError::Json)` - The body is not valid JSON of the expected shape
/// * `Err(CatalogError::Payload)` - The response has no `results` object
pub fn parse_detail(body: &str, url: &str) -> Result<ProductDetail, CatalogError> {
    let envelope: DetailEnvelope =
        serde_json::from_str(body).map_err(|source| CatalogError::Json {
            url: url.to_string(),
            source,
        })?;

    envelope.results.ok_or_else(|| CatalogError::Payload {
        url: url.to_string(),
        message: "response has no results object".to_string(),
    })
}

/// Builds the record for a fetched detail response
pub fn build_record(
    request: &DetailRequest,
    body: &str,
    timestamp: i64,
) -> Result<ProductRecord, CatalogError> {
    let detail = parse_detail(body, request.url.as_str())?;
    let record = normalize_product(&request.summary, &detail, request.url.as_str(), timestamp);

    if record.rpc.is_none() {
        tracing::warn!("Product {} has no vendor code", request.url);
    }
    Ok(record)
}

/// Fetches details for every incoming request and forwards the records
///
/// Returns once the walker has closed its side of the channel and every
/// spawned fetch has finished. If the export stage goes away first, pending
/// fetches are cancelled and the input is closed so the walker stops too.
pub async fn fetch_details(
    context: Arc<CrawlContext>,
    mut detail_rx: mpsc::Receiver<DetailRequest>,
    record_tx: mpsc::Sender<ProductRecord>,
) {
    let mut tasks = JoinSet::new();
    let mut input_open = true;

    while input_open || !tasks.is_empty() {
        tokio::select! {
            request = detail_rx.recv(), if input_open => match request {
                Some(request) => {
                    let context = context.clone();
                    let record_tx = record_tx.clone();
                    tasks.spawn(async move { fetch_detail(&context, request, &record_tx).await });
                }
                None => input_open = false,
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Detail task failed: {}", e);
                }
            }
            _ = record_tx.closed() => {
                tracing::warn!(
                    "Export stage stopped, cancelling {} pending detail fetches",
                    tasks.len()
                );
                tasks.abort_all();
                break;
            }
        }
    }

    detail_rx.close();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Err(e) if !e.is_cancelled() => tracing::error!("Detail task failed: {}", e),
            _ => {}
        }
    }
}

async fn fetch_detail(
    context: &CrawlContext,
    request: DetailRequest,
    record_tx: &mpsc::Sender<ProductRecord>,
) {
    tracing::info!("Parsing product: {}", request.url);

    let body = match context.fetcher.fetch(&request.url).await {
        FetchResult::Success { body, .. } => body,
        FetchResult::HttpError { status_code, .. } => {
            tracing::error!("Product {} returned HTTP {}", request.url, status_code);
            context.stats.record(Counter::DetailFailures);
            return;
        }
        FetchResult::NetworkError { error, .. } => {
            tracing::error!("Product {} failed: {}", request.url, error);
            context.stats.record(Counter::DetailFailures);
            return;
        }
    };

    let timestamp = chrono::Utc::now().timestamp();
    match build_record(&request, &body, timestamp) {
        Ok(record) => {
            if record_tx.send(record).await.is_err() {
                tracing::debug!("Export stage closed, dropping record for {}", request.url);
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            context.stats.record(Counter::DetailFailures);
        }
    }
}
