//! The exported product record
//!
//! Field order here is the field order of the exported feed.

use crate::normalize::payload::Price;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One normalized product, emitted once per listing/detail pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Capture time, seconds since the Unix epoch
    pub timestamp: i64,

    /// Vendor code from the detail payload
    #[serde(rename = "RPC")]
    pub rpc: Option<String>,

    /// Detail endpoint the record was built from
    pub url: String,

    pub title: String,
    pub marketing_tags: Vec<String>,
    pub brand: String,

    /// `[parent category, category]`
    pub section: Vec<String>,

    pub price_data: PriceData,
    pub stock: Stock,
    pub assets: Assets,

    /// `__description` first, then product properties in page order
    pub metadata: Map<String, Value>,

    /// The site has no variant grouping, so this is always 1
    pub variants: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub current: Option<Price>,
    pub original: Option<Price>,
    pub sale_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub in_stock: bool,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub main_image: Option<String>,
    pub set_images: Vec<String>,
    pub view360: Vec<String>,
    pub video: Vec<String>,
}

impl Assets {
    /// Builds assets for a product with a single picture
    ///
    /// The site never serves galleries, 360 views or video; those slots are
    /// written as `[""]` to keep the schema uniform.
    pub fn single_image(main_image: Option<String>) -> Self {
        Self {
            main_image,
            set_images: vec![String::new()],
            view360: vec![String::new()],
            video: vec![String::new()],
        }
    }
}
