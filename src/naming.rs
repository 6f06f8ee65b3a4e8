//! Image-name conventions for generated text.
//!
//! Image names in the metadata file are identifiers like `deep-cleaning` or
//! `team_photo`. When a record has no alt text (or has no record at all),
//! the name is turned into readable text by replacing separators with
//! spaces and prefixing the category's phrase:
//!
//! - `hero` / `main-banner` → "Professional cleaning service - main banner"
//! - `reviews` / `happy_customer` → "Customer review - happy customer"

use crate::types::Category;

/// Replace `-` and `_` separators with spaces, collapsing runs.
pub fn display_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Alt text used when a record carries none.
pub fn generated_alt(category: Category, name: &str) -> String {
    format!("{} - {}", category.alt_phrase(), display_name(name))
}

/// Resolve alt text: the record's own text when non-blank, else generated.
pub fn resolve_alt(category: Category, name: &str, alt: Option<&str>) -> String {
    alt.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| generated_alt(category, name))
}
