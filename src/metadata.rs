//! Image metadata store.
//!
//! The store is loaded once from a JSON document that maps category names to
//! objects keyed by image name:
//!
//! ```json
//! {
//!   "hero": {
//!     "main-banner": {
//!       "src": "/images/hero/main-banner.jpg",
//!       "webp": "/images/hero/main-banner.webp",
//!       "optimized": "/images/hero/main-banner-optimized.jpg",
//!       "alt": "Freshly cleaned living room",
//!       "title": "Spotless homes",
//!       "keywords": ["cleaning", "home"],
//!       "category": "hero",
//!       "priority": "high"
//!     }
//!   },
//!   "services": {},
//!   "seo": {
//!     "defaultImage": "/images/hero/main-banner.jpg",
//!     "businessImages": ["/images/about/team.jpg"]
//!   }
//! }
//! ```
//!
//! ## Degradation
//!
//! Nothing in this file is allowed to take the page down:
//!
//! - A missing or unparseable file yields an empty skeleton (every category
//!   present, no records) and a warning.
//! - An unknown top-level key is skipped with a warning.
//! - A malformed record is skipped with a warning; its siblings survive.
//!
//! [`MetadataStore::read`] is the strict variant that reports file-level
//! failures, for callers (like the CLI) that want to surface them.

use crate::types::{Category, ImageKey, Priority};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Metadata root must be a JSON object")]
    NotAnObject,
}

/// One image as described by the metadata file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub category: Category,
    pub name: String,
    pub primary_source: String,
    /// WebP variant, offered only when the runtime can decode it.
    pub modern_source: Option<String>,
    /// Optimized variant in the standard format.
    pub standard_source: Option<String>,
    pub alt_text: Option<String>,
    pub title: Option<String>,
    pub keywords: Vec<String>,
    pub priority: Priority,
}

impl ImageRecord {
    pub fn key(&self) -> ImageKey {
        ImageKey::new(self.category, self.name.clone())
    }
}

/// Social preview and structured-data images.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoImages {
    pub default_image: Option<String>,
    pub business_images: Vec<String>,
}

/// Record shape as it appears on disk. Fields are read loosely so one bad
/// value costs that field, not the record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    src: Value,
    webp: Value,
    optimized: Value,
    alt: Value,
    title: Value,
    keywords: Value,
    category: Value,
    priority: Value,
}

/// Trimmed string value; blank, null and non-string values are absent.
fn text_field(image: &ImageKey, field: &str, value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => {
            warn!(%image, field, value = %other, "ignoring non-string field");
            None
        }
    }
}

fn keywords(image: &ImageKey, value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        other => {
            warn!(%image, value = %other, "keywords is not a list; ignoring");
            Vec::new()
        }
    }
}

fn priority(image: &ImageKey, value: Value) -> Priority {
    if value.is_null() {
        return Priority::default();
    }
    serde_json::from_value(value.clone()).unwrap_or_else(|_| {
        warn!(%image, %value, "unknown priority; using medium");
        Priority::default()
    })
}

impl RawRecord {
    fn into_record(self, category: Category, name: &str) -> Option<ImageRecord> {
        let key = ImageKey::new(category, name);
        let primary_source = text_field(&key, "src", self.src)?;
        if let Some(declared) = text_field(&key, "category", self.category)
            && declared != category.as_str()
        {
            warn!(
                image = %key,
                declared = %declared,
                "record declares a different category; using its enclosing section"
            );
        }
        Some(ImageRecord {
            category,
            name: name.to_string(),
            primary_source,
            modern_source: text_field(&key, "webp", self.webp),
            standard_source: text_field(&key, "optimized", self.optimized),
            alt_text: text_field(&key, "alt", self.alt),
            title: text_field(&key, "title", self.title),
            keywords: keywords(&key, self.keywords),
            priority: priority(&key, self.priority),
        })
    }
}

/// All image records, grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataStore {
    categories: BTreeMap<Category, BTreeMap<String, ImageRecord>>,
    seo: SeoImages,
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::skeleton()
    }
}

impl MetadataStore {
    /// Every category present, no records.
    pub fn skeleton() -> Self {
        Self {
            categories: Category::ALL
                .into_iter()
                .map(|c| (c, BTreeMap::new()))
                .collect(),
            seo: SeoImages::default(),
        }
    }

    /// Load the metadata file, substituting the skeleton on any file-level
    /// failure.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(store) => {
                debug!(path = %path.display(), records = store.len(), "loaded image metadata");
                store
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    %err,
                    "image metadata unavailable; using empty skeleton"
                );
                Self::skeleton()
            }
        }
    }

    /// Strict load: file-level failures are errors, record-level ones are not.
    pub fn read(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, MetadataError> {
        let root: Value = serde_json::from_str(content)?;
        let Value::Object(sections) = root else {
            return Err(MetadataError::NotAnObject);
        };

        let mut store = Self::skeleton();
        for (key, value) in sections {
            if key == "seo" {
                match serde_json::from_value::<SeoImages>(value) {
                    Ok(seo) => store.seo = seo,
                    Err(err) => warn!(%err, "ignoring malformed seo section"),
                }
                continue;
            }
            let category = match key.parse::<Category>() {
                Ok(c) => c,
                Err(err) => {
                    warn!(%err, "skipping metadata section");
                    continue;
                }
            };
            let Value::Object(entries) = value else {
                warn!(%category, "category section is not an object; treating as empty");
                continue;
            };
            let records = store.categories.entry(category).or_default();
            for (name, raw) in entries {
                let parsed = serde_json::from_value::<RawRecord>(raw)
                    .map_err(|err| err.to_string())
                    .and_then(|r| {
                        r.into_record(category, &name)
                            .ok_or_else(|| "missing src".to_string())
                    });
                match parsed {
                    Ok(record) => {
                        records.insert(name, record);
                    }
                    Err(err) => {
                        let image = ImageKey::new(category, name.as_str());
                        warn!(%image, %err, "skipping malformed image record");
                    }
                }
            }
        }
        Ok(store)
    }

    pub fn get(&self, category: Category, name: &str) -> Option<&ImageRecord> {
        self.categories.get(&category)?.get(name)
    }

    /// Records of one category, ordered by name.
    pub fn category(&self, category: Category) -> impl Iterator<Item = &ImageRecord> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|records| records.values())
    }

    /// All records, category order then name order.
    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.categories.values().flat_map(|records| records.values())
    }

    pub fn seo(&self) -> &SeoImages {
        &self.seo
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
