//! Site configuration module.
//!
//! Loads and validates `config.toml`. The file in the config directory is
//! laid over stock defaults, so it needs only the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! metadata = "data/images.json"   # Image metadata file
//!
//! [lazy]
//! observer = true         # Runtime supports viewport observation
//! root_margin = 50        # Pixels of pre-emptive margin around the viewport
//! threshold = 0.01        # Minimum visible fraction that triggers a load
//!
//! [formats]
//! modern = "auto"         # WebP candidates: "auto" (probe), "always", "never"
//!
//! [fallbacks]
//! hero = "/images/fallbacks/hero-fallback.jpg"
//! services = "/images/fallbacks/service-fallback.jpg"
//! about = "/images/fallbacks/about-fallback.jpg"
//! reviews = "/images/fallbacks/review-fallback.jpg"
//! default = "/images/fallbacks/default.jpg"
//!
//! [seo]
//! business_name = "Sparkle Cleaning Co."
//! site_url = ""
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::lazy::{ObserverOptions, ObserverSupport};
use crate::negotiate::{EncoderProbe, FixedProbe, FormatNegotiator};
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Path to the image metadata file, relative to the working directory.
    pub metadata: String,
    /// Lazy-load observer settings.
    pub lazy: LazyConfig,
    /// Modern format negotiation.
    pub formats: FormatsConfig,
    /// Category → generic fallback source table.
    pub fallbacks: FallbackTable,
    /// Structured-data settings.
    pub seo: SeoConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            metadata: "data/images.json".to_string(),
            lazy: LazyConfig::default(),
            formats: FormatsConfig::default(),
            fallbacks: FallbackTable::default(),
            seo: SeoConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.lazy.threshold) {
            return Err(ConfigError::Validation(
                "lazy.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        let fallbacks = [
            ("hero", &self.fallbacks.hero),
            ("services", &self.fallbacks.services),
            ("about", &self.fallbacks.about),
            ("reviews", &self.fallbacks.reviews),
            ("default", &self.fallbacks.default),
        ];
        for (key, path) in fallbacks {
            if path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "fallbacks.{key} must not be empty"
                )));
            }
        }
        if self.metadata.trim().is_empty() {
            return Err(ConfigError::Validation("metadata must not be empty".into()));
        }
        Ok(())
    }
}

/// Lazy-load settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyConfig {
    /// Whether the target runtime can observe viewport intersection.
    /// When false, every lazy image loads immediately.
    pub observer: bool,
    /// Pixels of pre-emptive margin above and below the viewport.
    pub root_margin: u32,
    /// Minimum visible fraction (0.0–1.0) that triggers a load.
    pub threshold: f64,
}

impl Default for LazyConfig {
    fn default() -> Self {
        let opts = ObserverOptions::default();
        Self {
            observer: true,
            root_margin: opts.root_margin,
            threshold: opts.threshold,
        }
    }
}

impl LazyConfig {
    pub fn options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin: self.root_margin,
            threshold: self.threshold,
        }
    }

    pub fn support(&self) -> ObserverSupport {
        if self.observer {
            ObserverSupport::Available
        } else {
            ObserverSupport::Unavailable
        }
    }
}

/// How WebP support is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModernFormat {
    /// Probe the runtime once.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatsConfig {
    pub modern: ModernFormat,
}

impl FormatsConfig {
    pub fn negotiator(&self) -> FormatNegotiator {
        match self.modern {
            ModernFormat::Auto => FormatNegotiator::new(EncoderProbe),
            ModernFormat::Always => FormatNegotiator::new(FixedProbe(true)),
            ModernFormat::Never => FormatNegotiator::new(FixedProbe(false)),
        }
    }
}

/// Built-in fallback asset per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackTable {
    pub hero: String,
    pub services: String,
    pub about: String,
    pub reviews: String,
    /// Base source for degraded images in categories without an entry.
    pub default: String,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            hero: "/images/fallbacks/hero-fallback.jpg".to_string(),
            services: "/images/fallbacks/service-fallback.jpg".to_string(),
            about: "/images/fallbacks/about-fallback.jpg".to_string(),
            reviews: "/images/fallbacks/review-fallback.jpg".to_string(),
            default: "/images/fallbacks/default.jpg".to_string(),
        }
    }
}

impl FallbackTable {
    /// Generic fallback for a category; `backgrounds` has none.
    pub fn source_for(&self, category: Category) -> Option<&str> {
        match category {
            Category::Hero => Some(self.hero.as_str()),
            Category::Services => Some(self.services.as_str()),
            Category::About => Some(self.about.as_str()),
            Category::Reviews => Some(self.reviews.as_str()),
            Category::Backgrounds => None,
        }
    }

    /// Base source used when a record is missing entirely.
    pub fn degraded_source(&self, category: Category) -> &str {
        self.source_for(category).unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoConfig {
    pub business_name: String,
    /// Absolute site URL prefixed to image paths in structured data.
    /// Empty leaves paths as they are.
    pub site_url: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            business_name: "Sparkle Cleaning Co.".to_string(),
            site_url: String::new(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Stock defaults as a TOML table, the base the user file is laid over.
fn defaults_table() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Lay `user` over `base` in place. Sections merge key by key; any other
/// value replaces what was there.
fn overlay_toml(base: &mut toml::Value, user: toml::Value) {
    match (base, user) {
        (toml::Value::Table(base), toml::Value::Table(user)) => {
            for (key, value) in user {
                match base.get_mut(&key) {
                    Some(existing) => overlay_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// The user's `config.toml` in `dir`, if there is one.
fn read_user_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    match fs::read_to_string(dir.join("config.toml")) {
        Ok(content) => Ok(Some(toml::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load `config.toml` from `dir` over stock defaults and validate it.
/// A missing file yields the defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let mut table = defaults_table()?;
    if let Some(user) = read_user_config(dir)? {
        overlay_toml(&mut table, user);
    }
    let config: SiteConfig = table.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# picture-fallback configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Image metadata file (JSON: category -> image name -> record, plus "seo").
# A missing or invalid file is not fatal: an empty skeleton is used.
metadata = "data/images.json"

# ---------------------------------------------------------------------------
# Lazy loading
# ---------------------------------------------------------------------------
[lazy]
# Whether the target runtime can observe viewport intersection.
# false = every lazy image loads immediately.
observer = true

# Pixels of pre-emptive margin above and below the viewport.
root_margin = 50

# Minimum visible fraction (0.0 - 1.0) that triggers a load.
threshold = 0.01

# ---------------------------------------------------------------------------
# Formats
# ---------------------------------------------------------------------------
[formats]
# WebP candidates: "auto" probes the encoder once, "always" / "never" force it.
modern = "auto"

# ---------------------------------------------------------------------------
# Generic fallback images (used when a record has no alternate of its own)
# ---------------------------------------------------------------------------
[fallbacks]
hero = "/images/fallbacks/hero-fallback.jpg"
services = "/images/fallbacks/service-fallback.jpg"
about = "/images/fallbacks/about-fallback.jpg"
reviews = "/images/fallbacks/review-fallback.jpg"
# Base source for unknown images in categories without an entry above.
default = "/images/fallbacks/default.jpg"

# ---------------------------------------------------------------------------
# Structured data
# ---------------------------------------------------------------------------
[seo]
business_name = "Sparkle Cleaning Co."
# Absolute site URL prefixed to image paths, e.g. "https://example.com".
site_url = ""
"##
}
