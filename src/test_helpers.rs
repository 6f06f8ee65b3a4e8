//! Shared test utilities for the picture-fallback test suite.
//!
//! Provides a fixture metadata document, a store built from it, a tiny PNG
//! writer for filesystem fixtures, and a scriptable [`MockLoader`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = sample_store();
//! let loader = MockLoader::failing(&["/images/hero/main-banner.jpg"]);
//! // ... mount images, then inspect loader.attempts()
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;

use crate::loader::{ImageLoader, LoadError};
use crate::metadata::MetadataStore;

// =========================================================================
// Fixture metadata
// =========================================================================

pub const SAMPLE_METADATA: &str = r#"{
  "hero": {
    "main-banner": {
      "src": "/images/hero/main-banner.jpg",
      "webp": "/images/hero/main-banner.webp",
      "optimized": "/images/hero/main-banner-optimized.jpg",
      "alt": "Freshly cleaned living room",
      "title": "Spotless homes",
      "keywords": ["cleaning", "home"],
      "category": "hero",
      "priority": "high"
    }
  },
  "services": {
    "deep-cleaning": {
      "src": "/images/services/deep-cleaning.jpg",
      "webp": "/images/services/deep-cleaning.webp",
      "optimized": "/images/services/deep-cleaning-optimized.jpg",
      "alt": "Deep cleaning a kitchen",
      "category": "services"
    },
    "office_care": {
      "src": "/images/services/office-care.jpg",
      "category": "services",
      "priority": "low"
    }
  },
  "about": {
    "team-photo": {
      "src": "/images/about/team-photo.jpg",
      "optimized": "/images/about/team-photo-optimized.jpg",
      "alt": "Our cleaning team",
      "title": "Meet the team"
    }
  },
  "reviews": {
    "happy-customer": {
      "src": "/images/reviews/happy-customer.jpg"
    }
  },
  "backgrounds": {
    "sparkle-pattern": {
      "src": "/images/backgrounds/sparkle-pattern.png",
      "webp": "/images/backgrounds/sparkle-pattern.webp"
    }
  },
  "seo": {
    "defaultImage": "/images/hero/main-banner.jpg",
    "businessImages": [
      "/images/about/team-photo.jpg",
      "/images/services/deep-cleaning.jpg"
    ]
  }
}"#;

/// Store parsed from [`SAMPLE_METADATA`].
pub fn sample_store() -> MetadataStore {
    MetadataStore::from_json(SAMPLE_METADATA).unwrap()
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write a small decodable PNG, creating parent directories.
pub fn write_png(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(2, 2, image::Rgb([200, 220, 240]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Mock loader
// =========================================================================

/// Loader that fails for a configured set of sources and records every
/// attempt in order.
#[derive(Debug, Default)]
pub struct MockLoader {
    failing: BTreeSet<String>,
    fail_all: bool,
    attempts: RefCell<Vec<String>>,
}

impl MockLoader {
    /// Every source loads.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Every source fails.
    pub fn broken() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Listed sources fail, everything else loads.
    pub fn failing(sources: &[&str]) -> Self {
        Self {
            failing: sources.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.borrow().len()
    }
}

impl ImageLoader for MockLoader {
    fn attempt(&self, source: &str) -> Result<(), LoadError> {
        self.attempts.borrow_mut().push(source.to_string());
        if self.fail_all || self.failing.contains(source) {
            Err(LoadError::NotFound(source.into()))
        } else {
            Ok(())
        }
    }
}
