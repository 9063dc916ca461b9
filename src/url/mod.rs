//! URL handling for the catalog API
//!
//! This module provides the session locality, endpoint construction for the
//! three API calls the crawler makes, and slug extraction from category seeds.

mod endpoints;
mod seed;

use crate::config::SiteConfig;
use crate::CatalogError;
use url::Url;
use uuid::Uuid;

// Re-export main functions
pub use endpoints::{category_listing_url, city_binding_url, product_detail_url};
pub use seed::{category_slug, parse_seed_list, CategorySeed};

/// Session locality: the API root plus the city every request is scoped to
///
/// The catalog API answers with region-specific prices and stock, so every
/// endpoint builder takes a `Locality` instead of reading a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    base: Url,
    city_uuid: Uuid,
}

impl Locality {
    /// Creates a locality from an API root and a city identifier
    ///
    /// Any query or fragment on the base URL is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use alkoteka_catalog::url::Locality;
    /// use uuid::Uuid;
    ///
    /// let city = Uuid::parse_str("4a70f9e0-46ae-11e7-83ff-00155d026416").unwrap();
    /// let locality = Locality::new("https://alkoteka.com/web-api/v1/", city).unwrap();
    /// assert_eq!(locality.city_uuid(), city);
    /// ```
    pub fn new(base_url: &str, city_uuid: Uuid) -> Result<Self, CatalogError> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(CatalogError::InvalidBase(base_url.to_string()));
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base, city_uuid })
    }

    /// Builds the locality described by the `[site]` configuration table
    pub fn from_config(site: &SiteConfig) -> Result<Self, CatalogError> {
        Self::new(&site.base_url, site.city_uuid)
    }

    /// The API root endpoints are resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn city_uuid(&self) -> Uuid {
        self.city_uuid
    }
}
