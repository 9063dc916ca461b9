//! Endpoint construction for the catalog API
//!
//! Every endpoint carries the locality's `city_uuid` query parameter.

use crate::url::Locality;
use url::Url;

/// Builds the city binding endpoint: `<base>/city?city_uuid=<uuid>`
pub fn city_binding_url(locality: &Locality) -> Url {
    endpoint(locality, &["city"])
}

/// Builds a category listing endpoint
///
/// Shape: `<base>/product?city_uuid=<uuid>&page=<n>&per_page=<n>&root_category_slug=<slug>`
pub fn category_listing_url(locality: &Locality, slug: &str, page: u32, per_page: u32) -> Url {
    let mut url = endpoint(locality, &["product"]);
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &per_page.to_string())
        .append_pair("root_category_slug", slug);
    url
}

/// Builds a product detail endpoint: `<base>/product/<slug>?city_uuid=<uuid>`
pub fn product_detail_url(locality: &Locality, slug: &str) -> Url {
    endpoint(locality, &["product", slug])
}

fn endpoint(locality: &Locality, segments: &[&str]) -> Url {
    let mut url = locality.base().clone();
    // Locality guarantees a base URL, so path segments are always available
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.query_pairs_mut()
        .append_pair("city_uuid", &locality.city_uuid().to_string());
    url
}
