//! Picture element builder.
//!
//! Composes a metadata record, the format negotiator and the fallback table
//! into a [`RenderableImage`]: ordered `<source>` candidates plus the
//! terminal `<img>` that carries the fallback chain.
//!
//! ## Rendered markup
//!
//! ```html
//! <picture>
//!   <source srcset="/images/hero/main-banner.webp" type="image/webp">
//!   <source srcset="/images/hero/main-banner-optimized.jpg" type="image/jpeg">
//!   <img src="/images/hero/main-banner.jpg"
//!        alt="..." data-category="hero" data-name="main-banner"
//!        data-fallback-level="0"
//!        data-fallback-src="/images/hero/main-banner-optimized.jpg"
//!        decoding="async" loading="eager">
//! </picture>
//! ```
//!
//! Lazy units also carry the `loading` class until their first load settles.
//!
//! ## Degraded units
//!
//! An image with no record still renders. Its base source is the
//! category's generic fallback (or `fallbacks.default` for categories
//! without one), it has no candidates and no alternate, and its alt text
//! is generated from the name.

use crate::config::FallbackTable;
use crate::element::{ElementSurface, ManagedElement};
use crate::fallback::{ImageElementState, LEVEL_ATTRIBUTE, LOADING_CLASS};
use crate::metadata::{ImageRecord, MetadataStore};
use crate::naming;
use crate::negotiate::FormatNegotiator;
use crate::types::{Category, FallbackLevel, ImageKey, LoadingMode, Priority};
use maud::{Markup, html};
use std::path::Path;
use tracing::warn;

/// Per-build options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Load immediately regardless of priority.
    pub eager: bool,
}

impl BuildOptions {
    pub fn eager() -> Self {
        Self { eager: true }
    }
}

/// One `<source>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub srcset: String,
    pub mime: Option<&'static str>,
}

impl SourceCandidate {
    fn new(srcset: &str) -> Self {
        Self {
            srcset: srcset.to_string(),
            mime: mime_for(srcset),
        }
    }
}

/// MIME type from a source's file extension.
pub fn mime_for(source: &str) -> Option<&'static str> {
    let path = source.split(['?', '#']).next().unwrap_or_default();
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "webp" => Some("image/webp"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "avif" => Some("image/avif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// A picture ready to render and mount.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableImage {
    pub key: ImageKey,
    /// Format candidates in preference order.
    pub candidates: Vec<SourceCandidate>,
    /// Base source of the terminal image.
    pub source: String,
    /// Secondary source tried after the base source fails.
    pub alternate: Option<String>,
    pub alt_text: String,
    pub title: Option<String>,
    pub loading: LoadingMode,
    /// Built without a metadata record.
    pub degraded: bool,
}

impl RenderableImage {
    /// Fresh fallback state for one mounted instance.
    pub fn initial_state(&self) -> ImageElementState {
        ImageElementState::new(
            self.key.clone(),
            self.source.clone(),
            self.alternate.clone(),
            self.alt_text.clone(),
        )
    }

    /// The terminal `<img>` and its container before any load.
    pub fn initial_element(&self) -> ManagedElement {
        let mut element = ManagedElement::new(self.source.clone());
        element.set_attribute("alt", &self.alt_text);
        if let Some(title) = &self.title {
            element.set_attribute("title", title);
        }
        element.set_attribute("data-category", self.key.category.as_str());
        element.set_attribute("data-name", &self.key.name);
        element.set_attribute(LEVEL_ATTRIBUTE, &FallbackLevel::Primary.as_u8().to_string());
        if let Some(alternate) = &self.alternate {
            element.set_attribute("data-fallback-src", alternate);
        }
        element.set_attribute("decoding", "async");
        element.set_attribute("loading", self.loading.as_str());
        if self.loading == LoadingMode::Lazy {
            element.add_class(LOADING_CLASS);
        }
        element
    }

    pub fn sources(&self) -> Markup {
        html! {
            @for candidate in &self.candidates {
                source srcset=(candidate.srcset) type=[candidate.mime];
            }
        }
    }

    pub fn render(&self) -> Markup {
        self.initial_element().render_in_container(self.sources())
    }
}

/// Builds renderable images from the metadata store.
#[derive(Debug, Clone, Copy)]
pub struct PictureBuilder<'a> {
    store: &'a MetadataStore,
    negotiator: &'a FormatNegotiator,
    fallbacks: &'a FallbackTable,
}

impl<'a> PictureBuilder<'a> {
    pub fn new(
        store: &'a MetadataStore,
        negotiator: &'a FormatNegotiator,
        fallbacks: &'a FallbackTable,
    ) -> Self {
        Self {
            store,
            negotiator,
            fallbacks,
        }
    }

    pub fn build(&self, category: Category, name: &str, options: BuildOptions) -> RenderableImage {
        match self.store.get(category, name) {
            Some(record) => self.from_record(record, options),
            None => self.degraded(category, name, options),
        }
    }

    fn from_record(&self, record: &ImageRecord, options: BuildOptions) -> RenderableImage {
        let mut candidates = Vec::with_capacity(2);
        if let Some(modern) = &record.modern_source
            && self.negotiator.supports_modern_format()
        {
            candidates.push(SourceCandidate::new(modern));
        }
        let standard = record
            .standard_source
            .as_deref()
            .unwrap_or(&record.primary_source);
        candidates.push(SourceCandidate::new(standard));

        let loading = if options.eager || record.priority == Priority::High {
            LoadingMode::Eager
        } else {
            LoadingMode::Lazy
        };

        RenderableImage {
            key: record.key(),
            candidates,
            source: record.primary_source.clone(),
            alternate: self.alternate_for(record),
            alt_text: naming::resolve_alt(
                record.category,
                &record.name,
                record.alt_text.as_deref(),
            ),
            title: record.title.clone(),
            loading,
            degraded: false,
        }
    }

    /// The record's standard source, else the category fallback, whichever
    /// first differs from the primary.
    fn alternate_for(&self, record: &ImageRecord) -> Option<String> {
        let primary = record.primary_source.as_str();
        record
            .standard_source
            .as_deref()
            .filter(|s| *s != primary)
            .or_else(|| {
                self.fallbacks
                    .source_for(record.category)
                    .filter(|s| *s != primary)
            })
            .map(String::from)
    }

    fn degraded(&self, category: Category, name: &str, options: BuildOptions) -> RenderableImage {
        let key = ImageKey::new(category, name);
        let source = self.fallbacks.degraded_source(category).to_string();
        warn!(image = %key, %source, "no metadata record; rendering generic fallback");
        RenderableImage {
            key,
            candidates: Vec::new(),
            source,
            alternate: None,
            alt_text: naming::generated_alt(category, name),
            title: None,
            loading: if options.eager {
                LoadingMode::Eager
            } else {
                LoadingMode::Lazy
            },
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::FixedProbe;
    use crate::test_helpers::sample_store;

    fn build_with(
        modern: bool,
        category: Category,
        name: &str,
        options: BuildOptions,
    ) -> RenderableImage {
        let store = sample_store();
        let negotiator = FormatNegotiator::new(FixedProbe(modern));
        let fallbacks = FallbackTable::default();
        PictureBuilder::new(&store, &negotiator, &fallbacks).build(category, name, options)
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for("/a/b.webp"), Some("image/webp"));
        assert_eq!(mime_for("/a/b.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for("/a/b.png?v=1"), Some("image/png"));
        assert_eq!(mime_for("/a/b"), None);
    }

    // =========================================================================
    // Candidate ordering
    // =========================================================================

    #[test]
    fn modern_candidate_first_when_supported() {
        let image = build_with(true, Category::Hero, "main-banner", BuildOptions::default());
        let srcsets: Vec<&str> = image.candidates.iter().map(|c| c.srcset.as_str()).collect();
        assert_eq!(
            srcsets,
            vec![
                "/images/hero/main-banner.webp",
                "/images/hero/main-banner-optimized.jpg"
            ]
        );
        assert_eq!(image.candidates[0].mime, Some("image/webp"));
    }

    #[test]
    fn modern_candidate_omitted_without_support() {
        let image = build_with(false, Category::Hero, "main-banner", BuildOptions::default());
        assert_eq!(image.candidates.len(), 1);
        assert!(image.candidates.iter().all(|c| c.mime != Some("image/webp")));
        assert!(!image.render().into_string().contains(".webp"));
    }

    #[test]
    fn standard_candidate_falls_back_to_primary() {
        let image = build_with(true, Category::Reviews, "happy-customer", BuildOptions::default());
        assert_eq!(image.candidates.len(), 1);
        assert_eq!(image.candidates[0].srcset, image.source);
    }

    // =========================================================================
    // Loading mode, alt text, alternate selection
    // =========================================================================

    #[test]
    fn high_priority_is_eager() {
        let image = build_with(true, Category::Hero, "main-banner", BuildOptions::default());
        assert_eq!(image.loading, LoadingMode::Eager);
    }

    #[test]
    fn medium_priority_is_lazy_unless_requested() {
        let lazy = build_with(true, Category::Services, "deep-cleaning", BuildOptions::default());
        assert_eq!(lazy.loading, LoadingMode::Lazy);
        let eager = build_with(true, Category::Services, "deep-cleaning", BuildOptions::eager());
        assert_eq!(eager.loading, LoadingMode::Eager);
    }

    #[test]
    fn record_alt_text_is_used() {
        let image = build_with(true, Category::Hero, "main-banner", BuildOptions::default());
        assert_eq!(image.alt_text, "Freshly cleaned living room");
    }

    #[test]
    fn missing_alt_text_is_generated() {
        let image = build_with(true, Category::Reviews, "happy-customer", BuildOptions::default());
        assert_eq!(image.alt_text, "Customer review - happy customer");
    }

    #[test]
    fn alternate_prefers_optimized_source() {
        let image = build_with(true, Category::Hero, "main-banner", BuildOptions::default());
        assert_eq!(
            image.alternate.as_deref(),
            Some("/images/hero/main-banner-optimized.jpg")
        );
    }

    #[test]
    fn alternate_falls_back_to_category_source() {
        let image = build_with(true, Category::Reviews, "happy-customer", BuildOptions::default());
        assert_eq!(
            image.alternate.as_deref(),
            Some("/images/fallbacks/review-fallback.jpg")
        );
    }

    #[test]
    fn backgrounds_without_optimized_have_no_alternate() {
        let options = BuildOptions::default();
        let image = build_with(true, Category::Backgrounds, "sparkle-pattern", options);
        assert_eq!(image.alternate, None);
    }

    // =========================================================================
    // Degraded construction
    // =========================================================================

    #[test]
    fn absent_record_uses_category_fallback() {
        let image = build_with(true, Category::Services, "window-washing", BuildOptions::default());
        assert!(image.degraded);
        assert_eq!(image.source, "/images/fallbacks/service-fallback.jpg");
        assert_eq!(image.alt_text, "Our services - window washing");
        assert!(image.candidates.is_empty());
        assert_eq!(image.alternate, None);
    }

    #[test]
    fn absent_background_uses_default_fallback() {
        let image = build_with(true, Category::Backgrounds, "missing", BuildOptions::default());
        assert_eq!(image.source, "/images/fallbacks/default.jpg");
    }

    // =========================================================================
    // Markup
    // =========================================================================

    #[test]
    fn render_carries_markup_contract() {
        let html = build_with(false, Category::Services, "deep-cleaning", BuildOptions::default())
            .render()
            .into_string();
        assert!(html.starts_with("<picture>"));
        assert!(html.contains(r#"data-category="services""#));
        assert!(html.contains(r#"data-name="deep-cleaning""#));
        assert!(html.contains(r#"data-fallback-level="0""#));
        assert!(html.contains(
            r#"data-fallback-src="/images/services/deep-cleaning-optimized.jpg""#
        ));
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"decoding="async""#));
        assert!(html.contains(r#"class="loading""#));
    }

    #[test]
    fn eager_units_have_no_loading_class() {
        let html = build_with(true, Category::Hero, "main-banner", BuildOptions::default())
            .render()
            .into_string();
        assert!(html.contains(r#"loading="eager""#));
        assert!(!html.contains(r#"class="loading""#));
        assert!(html.contains(r#"title="Spotless homes""#));
    }

    #[test]
    fn sources_precede_img() {
        let html = build_with(true, Category::Hero, "main-banner", BuildOptions::default())
            .render()
            .into_string();
        let webp = html.find("image/webp").unwrap();
        let jpeg = html.find("image/jpeg").unwrap();
        let img = html.find("<img").unwrap();
        assert!(webp < jpeg && jpeg < img);
    }
}
