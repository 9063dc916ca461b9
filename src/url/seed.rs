//! Category seed parsing
//!
//! Seeds are storefront category URLs, one per line. Only the trailing path
//! segment (the category slug) is used to address the listing API.

/// A category seed line together with its derived slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySeed {
    /// The trimmed seed line
    pub url: String,

    /// Root category slug passed to the listing endpoint
    pub slug: String,
}

impl CategorySeed {
    /// Parses one seed line
    ///
    /// Returns `None` for blank lines and for lines without a usable slug.
    pub fn parse(line: &str) -> Option<Self> {
        let url = line.trim();
        if url.is_empty() {
            return None;
        }
        let slug = category_slug(url)?;
        Some(Self {
            url: url.to_string(),
            slug: slug.to_string(),
        })
    }
}

/// Extracts the category slug from a seed URL
///
/// The slug is the last non-empty path segment; query and fragment are ignored.
///
/// # Examples
///
/// ```
/// use alkoteka_catalog::url::category_slug;
///
/// assert_eq!(category_slug("https://alkoteka.com/catalog/vodka"), Some("vodka"));
/// assert_eq!(category_slug("https://alkoteka.com/catalog/vodka/"), Some("vodka"));
/// assert_eq!(category_slug("   "), None);
/// ```
pub fn category_slug(seed: &str) -> Option<&str> {
    let seed = seed.trim();
    let end = seed.find(['?', '#']).unwrap_or(seed.len());
    seed[..end]
        .split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.ends_with(':'))
}

/// Parses a line-oriented seed list
///
/// Blank and whitespace-only lines are skipped silently; lines without a
/// slug are skipped with a warning.
pub fn parse_seed_list(content: &str) -> Vec<CategorySeed> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let seed = CategorySeed::parse(line);
            if seed.is_none() {
                tracing::warn!("No category slug in seed line: {}", line.trim());
            }
            seed
        })
        .collect()
}
