//! Field extraction rules
//!
//! Each rule takes typed payload fragments and returns the value that lands in
//! the exported record. None of them touch shared state.

use crate::normalize::payload::{DescriptionBlock, FilterLabel, Price, TextBlock};
use serde_json::{Map, Value};

/// Title of the text block holding the product description
const DESCRIPTION_TITLE: &str = "описание";

/// Title of the property row naming the brand
const BRAND_TITLE: &str = "бренд";

/// Filter key of the volume facet
const VOLUME_FILTER: &str = "obem";

const LINE_BREAKS: [&str; 3] = ["<br>", "<br/>", "<br />"];

/// Resolves the pre-discount price
///
/// A missing or zero previous price means the product is not discounted and
/// the current price is also the original one.
pub fn original_price(current: Option<Price>, previous: Option<Price>) -> Option<Price> {
    previous.filter(|p| p.value() != 0.0).or(current)
}

/// Whole-percent discount, or `None` when the product is not discounted
///
/// A non-positive original price is treated as no discount. Halves round to
/// the nearest even percent.
pub fn discount_percent(current: Price, original: Price) -> Option<i64> {
    let (current, original) = (current.value(), original.value());
    if original <= 0.0 || current >= original {
        return None;
    }
    Some(((1.0 - current / original) * 100.0).round_ties_even() as i64)
}

/// Human-readable discount badge, `"Скидка N%"`, or empty
///
/// # Examples
///
/// ```
/// use alkoteka_catalog::normalize::{sale_tag, Price};
///
/// assert_eq!(sale_tag(Some(Price(800.0)), Some(Price(1000.0))), "Скидка 20%");
/// assert_eq!(sale_tag(Some(Price(1000.0)), Some(Price(1000.0))), "");
/// ```
pub fn sale_tag(current: Option<Price>, original: Option<Price>) -> String {
    match (current, original) {
        (Some(current), Some(original)) => discount_percent(current, original)
            .map(|percent| format!("Скидка {}%", percent))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Extracts the description text
///
/// Picks the first block titled "Описание" (case-insensitive, trimmed), drops
/// `<br>` markup and surrounding whitespace. Empty when no such block exists.
pub fn extract_description(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .find(|block| {
            block
                .title
                .as_deref()
                .is_some_and(|title| title.trim().to_lowercase() == DESCRIPTION_TITLE)
        })
        .and_then(|block| block.content.as_deref())
        .map(|content| {
            LINE_BREAKS
                .iter()
                .fold(content.to_string(), |text, tag| text.replace(tag, ""))
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Product properties collected from description blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    /// Property name to value, in page order, last write wins
    pub entries: Map<String, Value>,

    /// Value of the "Бренд" row, empty when absent
    pub brand: String,
}

/// Extracts property key/value pairs and the brand
///
/// A block's value is the name of its first entry in `values`; when `values`
/// is empty the block's `min` is used, but only if the block is enabled.
/// Otherwise the block is skipped. Pairs with an empty key or a falsy value
/// are not recorded.
pub fn extract_properties(blocks: &[DescriptionBlock]) -> Properties {
    let mut properties = Properties::default();

    for block in blocks {
        let value = match block.values.first() {
            Some(first) => first.name.clone(),
            None if block.enabled => block.min.clone(),
            None => continue,
        };

        let (Some(key), Some(value)) = (block.title.as_deref(), value) else {
            continue;
        };
        if key.is_empty() || !is_truthy(&value) {
            continue;
        }

        if key.to_lowercase() == BRAND_TITLE {
            properties.brand = value_as_text(&value);
        }
        properties.entries.insert(key.to_string(), value);
    }

    properties
}

/// Finds the volume label among the filter labels
pub fn volume_label(labels: &[FilterLabel]) -> Option<&str> {
    labels
        .iter()
        .find(|label| label.filter.as_deref() == Some(VOLUME_FILTER))
        .and_then(|label| label.title.as_deref())
        .filter(|title| !title.trim().is_empty())
}

/// Appends the volume to the title as `", <volume>"`
///
/// Nothing is appended when the title already contains the volume, so the
/// rule is idempotent.
///
/// # Examples
///
/// ```
/// use alkoteka_catalog::normalize::title_with_volume;
///
/// let once = title_with_volume("Водка Белуга", Some("0.5 Л"));
/// assert_eq!(once, "Водка Белуга, 0.5 Л");
/// assert_eq!(title_with_volume(&once, Some("0.5 Л")), once);
/// ```
pub fn title_with_volume(title: &str, volume: Option<&str>) -> String {
    match volume {
        Some(volume) if !title.contains(volume) => {
            // Bare volume rather than a dangling ", <volume>"
            if title.is_empty() {
                volume.to_string()
            } else {
                format!("{}, {}", title, volume)
            }
        }
        _ => title.to_string(),
    }
}

/// JSON truthiness: null, false, zero, and empty strings, arrays, objects are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
