//! City binding
//!
//! The catalog API scopes prices and stock to a city. The crawl binds its
//! city once, before any catalog request; a rejected binding ends the run.

use crate::crawler::fetcher::{body_preview, FetchResult, Fetcher};
use crate::url::{city_binding_url, Locality};
use crate::CatalogError;

/// Binds the locality's city to the crawl session
///
/// # Returns
///
/// * `Ok(())` - The API answered 200; the catalog walk may start
/// * `Err(CatalogError::LocalityRejected)` - Any other status
/// * `Err(CatalogError::LocalityUnreachable)` - The request itself failed
pub async fn initialize_locality(fetcher: &Fetcher, locality: &Locality) -> Result<(), CatalogError> {
    let url = city_binding_url(locality);
    tracing::info!("Binding city {} to the session", locality.city_uuid());

    match fetcher.fetch(&url).await {
        FetchResult::Success {
            status_code: 200, ..
        } => {
            tracing::info!("City bound: {} (status 200)", url);
            Ok(())
        }
        FetchResult::Success {
            status_code, body, ..
        }
        | FetchResult::HttpError { status_code, body } => {
            let body = body_preview(&body);
            tracing::error!(
                "Failed to bind city. Status: {}, response: {}",
                status_code,
                body
            );
            Err(CatalogError::LocalityRejected {
                status: status_code,
                body,
            })
        }
        FetchResult::NetworkError { error, .. } => {
            tracing::error!("Failed to bind city via {}: {}", url, error);
            Err(CatalogError::LocalityUnreachable {
                url: url.to_string(),
                error,
            })
        }
    }
}
