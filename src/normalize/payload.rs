//! Typed views of the listing and detail payloads
//!
//! The API omits fields or sends `null` freely. Every field here is either an
//! `Option` or falls back to an explicit default, so absence is decided at
//! decode time instead of surfacing later as a missing key.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A price as sent by the API
///
/// Whole amounts are written back as integers, so `800` stays `800`
/// rather than becoming `800.0` in the exported feed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Price(pub f64);

impl Price {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        if self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Category listing response: `{ "results": [ <summary>, ... ] }`
///
/// Entries stay untyped here so one odd entry cannot sink the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Value>,
}

/// Product detail response: `{ "results": <detail> }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailEnvelope {
    #[serde(default)]
    pub results: Option<ProductDetail>,
}

/// Lightweight product entry from a category listing
///
/// Only the slug decides whether an entry is usable. Any other field with an
/// unexpected type decodes to its default instead of failing the entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub category: Option<CategoryRef>,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(deserialize_with = "lenient_price")]
    pub prev_price: Option<Price>,
    #[serde(deserialize_with = "lenient_flag")]
    pub available: bool,
    #[serde(deserialize_with = "lenient_count")]
    pub quantity_total: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_labels: Vec<ActionLabel>,
    #[serde(deserialize_with = "lenient_list")]
    pub filter_labels: Vec<FilterLabel>,
}

impl ProductSummary {
    /// Slug usable for the detail endpoint, if any
    pub fn usable_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub parent: Option<ParentCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParentCategory {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Marketing badge shown on the product card
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionLabel {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

/// Facet label; the one with `filter == "obem"` carries the bottle volume
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterLabel {
    #[serde(deserialize_with = "lenient_string")]
    pub filter: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

/// Per-product detail record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub vendor_code: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub text_blocks: Vec<TextBlock>,
    #[serde(deserialize_with = "null_as_default")]
    pub description_blocks: Vec<DescriptionBlock>,
}

/// Free-text section of the product page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Property row of the product page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DescriptionBlock {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub values: Vec<BlockValue>,
    pub min: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockValue {
    pub name: Option<Value>,
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts identifiers sent either as strings or as numbers
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Falls back to the default when the value has an unexpected shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes a list element by element, dropping elements that do not fit
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts prices sent as numbers or numeric strings such as `"799.00"`
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Price>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(Price),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(Price),
        _ => None,
    })
}

/// Accepts availability sent as a boolean, a 0/1 number or a string
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

/// Accepts stock counts sent as integers or as whole floats
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    })
}
