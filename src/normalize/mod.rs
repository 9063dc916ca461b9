//! Record normalization
//!
//! Merges a listing summary with its detail payload into the flat
//! [`ProductRecord`] the crawler exports.

mod extract;
mod payload;
mod record;

pub use extract::{
    discount_percent, extract_description, extract_properties, original_price, sale_tag,
    title_with_volume, volume_label, Properties,
};
pub use payload::{
    ActionLabel, BlockValue, CategoryRef, DescriptionBlock, DetailEnvelope, FilterLabel,
    ListingEnvelope, ParentCategory, Price, ProductDetail, ProductSummary, TextBlock,
};
pub use record::{Assets, PriceData, ProductRecord, Stock};

use serde_json::{Map, Value};

/// Metadata key holding the cleaned description text
pub const DESCRIPTION_KEY: &str = "__description";

/// Builds the exported record for one product
///
/// # Arguments
///
/// * `summary` - The product's entry from the category listing
/// * `detail` - The product's detail payload
/// * `url` - The detail endpoint the payload came from
/// * `timestamp` - Capture time, seconds since the Unix epoch
pub fn normalize_product(
    summary: &ProductSummary,
    detail: &ProductDetail,
    url: &str,
    timestamp: i64,
) -> ProductRecord {
    let current = summary.price;
    let original = original_price(current, summary.prev_price);

    let description = extract_description(&detail.text_blocks);
    let properties = extract_properties(&detail.description_blocks);

    let mut metadata = Map::new();
    metadata.insert(DESCRIPTION_KEY.to_string(), Value::String(description));
    metadata.extend(properties.entries);

    let title = title_with_volume(
        summary.name.as_deref().unwrap_or_default(),
        volume_label(&summary.filter_labels),
    );

    ProductRecord {
        timestamp,
        rpc: detail.vendor_code.clone(),
        url: url.to_string(),
        title,
        marketing_tags: summary
            .action_labels
            .iter()
            .filter_map(|label| label.title.clone())
            .filter(|title| !title.is_empty())
            .collect(),
        brand: properties.brand,
        section: section(summary.category.as_ref()),
        price_data: PriceData {
            current,
            original,
            sale_tag: sale_tag(current, original),
        },
        stock: Stock {
            in_stock: summary.available,
            count: summary.quantity_total.unwrap_or(0),
        },
        assets: Assets::single_image(summary.image_url.clone()),
        metadata,
        variants: 1,
    }
}

fn section(category: Option<&CategoryRef>) -> Vec<String> {
    let parent = category
        .and_then(|c| c.parent.as_ref())
        .and_then(|p| p.name.clone())
        .unwrap_or_default();
    let own = category.and_then(|c| c.name.clone()).unwrap_or_default();
    vec![parent, own]
}
