//! End-to-end tests: metadata file on disk → session → rendered markup,
//! driven through the public API only.
//!
//! Run with: cargo test --test fallback_chain

use picture_fallback::config::{FallbackTable, SiteConfig};
use picture_fallback::lazy::{
    IntersectionEntry, LazyScheduler, ObserverOptions, ObserverSupport, Span,
};
use picture_fallback::loader::{FsLoader, ImageLoader, LoadError};
use picture_fallback::metadata::MetadataStore;
use picture_fallback::negotiate::{FixedProbe, FormatNegotiator};
use picture_fallback::picture::BuildOptions;
use picture_fallback::session::ImageSession;
use picture_fallback::types::{Category, FallbackLevel, ImageKey};
use std::cell::RefCell;
use std::path::Path;
use tempfile::TempDir;

const METADATA: &str = r#"{
  "hero": {
    "main-banner": {
      "src": "/images/hero/main-banner.jpg",
      "webp": "/images/hero/main-banner.webp",
      "optimized": "/images/hero/main-banner-optimized.png",
      "alt": "Freshly cleaned living room",
      "priority": "high"
    }
  },
  "services": {
    "deep-cleaning": {
      "src": "/images/services/deep-cleaning.png",
      "webp": "/images/services/deep-cleaning.webp"
    },
    "carpet-care": {
      "src": "/images/services/carpet-care.png"
    }
  },
  "backgrounds": {
    "sparkle": { "src": "/images/backgrounds/sparkle.png" }
  }
}"#;

/// Records every attempt; fails everything.
#[derive(Default)]
struct RecordingLoader {
    attempts: RefCell<Vec<String>>,
}

impl ImageLoader for RecordingLoader {
    fn attempt(&self, source: &str) -> Result<(), LoadError> {
        self.attempts.borrow_mut().push(source.to_string());
        Err(LoadError::NotFound(source.into()))
    }
}

fn store() -> MetadataStore {
    MetadataStore::from_json(METADATA).unwrap()
}

fn session(modern: bool, support: ObserverSupport) -> ImageSession {
    ImageSession::new(
        store(),
        FormatNegotiator::new(FixedProbe(modern)),
        FallbackTable::default(),
        LazyScheduler::new(support, ObserverOptions::default()),
    )
}

fn write_png(root: &Path, uri: &str) {
    let path = root.join(uri.trim_start_matches('/'));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
}

// =============================================================================
// Format negotiation
// =============================================================================

#[test]
fn modern_candidate_precedes_standard_when_supported() {
    let html = session(true, ObserverSupport::Available)
        .build(Category::Services, "deep-cleaning", BuildOptions::default())
        .render()
        .into_string();
    let webp = html.find(r#"type="image/webp""#).unwrap();
    let png = html.find(r#"type="image/png""#).unwrap();
    assert!(webp < png);
}

#[test]
fn modern_candidate_omitted_without_support() {
    let html = session(false, ObserverSupport::Available)
        .build(Category::Services, "deep-cleaning", BuildOptions::default())
        .render()
        .into_string();
    assert!(!html.contains("image/webp"));
    assert!(html.contains(r#"type="image/png""#));
}

// =============================================================================
// Degraded construction
// =============================================================================

#[test]
fn missing_metadata_file_renders_degraded_units() {
    let tmp = TempDir::new().unwrap();
    let store = MetadataStore::load(&tmp.path().join("nope.json"));
    let session = ImageSession::from_config(store, &SiteConfig::default());
    let image = session.build(Category::Services, "window_cleaning", BuildOptions::default());
    assert!(image.degraded);
    assert_eq!(image.source, "/images/fallbacks/service-fallback.jpg");
    assert_eq!(image.alt_text, "Our services - window cleaning");
    let html = image.render().into_string();
    assert!(html.contains(r#"src="/images/fallbacks/service-fallback.jpg""#));
    assert!(html.contains(r#"alt="Our services - window cleaning""#));
}

// =============================================================================
// Lazy loading
// =============================================================================

#[test]
fn without_observer_all_ten_images_load_immediately() {
    let mut s = session(true, ObserverSupport::Unavailable);
    let loader = RecordingLoader::default();
    for n in 0..10 {
        s.mount(Category::About, &format!("photo-{n}"), BuildOptions::default(), &loader);
    }
    let attempts = loader.attempts.borrow();
    // Degraded units have no alternate: one attempt each.
    assert_eq!(attempts.len(), 10);
    assert!(attempts.iter().all(|a| a == "/images/fallbacks/about-fallback.jpg"));
}

#[test]
fn scrolling_triggers_only_nearby_images() {
    let mut s = session(true, ObserverSupport::Available);
    let loader = RecordingLoader::default();
    let near = s.mount(Category::Services, "deep-cleaning", BuildOptions::default(), &loader);
    let far = s.mount(Category::Services, "carpet-care", BuildOptions::default(), &loader);
    assert!(loader.attempts.borrow().is_empty());

    let viewport = Span::new(0.0, 800.0);
    let options = ObserverOptions::default();
    let entries = [
        IntersectionEntry::measure(near.id(), Span::new(820.0, 300.0), viewport, &options),
        IntersectionEntry::measure(far.id(), Span::new(3000.0, 300.0), viewport, &options),
    ];
    assert_eq!(s.handle_intersections(&entries, &loader), vec![near.id()]);
    assert!(s.scheduler().is_observed(far.id()));
}

// =============================================================================
// Full chain against a site directory
// =============================================================================

#[test]
fn check_against_site_directory() {
    let site = TempDir::new().unwrap();
    // main-banner: primary missing, optimized present → secondary.
    write_png(site.path(), "/images/hero/main-banner-optimized.png");
    // deep-cleaning: primary present → primary.
    write_png(site.path(), "/images/services/deep-cleaning.png");
    // carpet-care: nothing, category fallback missing too → placeholder.
    // sparkle: nothing, no alternate → placeholder after one attempt.

    let loader = FsLoader::new(site.path());
    let mut s = session(true, ObserverSupport::Available);
    let keys: Vec<_> = s.store().records().map(|r| r.key()).collect();
    for key in &keys {
        s.mount(key.category, &key.name, BuildOptions::default(), &loader);
    }
    s.load_pending(&loader);

    let level = |category, name: &str| {
        let id = s.find(&ImageKey::new(category, name)).unwrap();
        s.state(id).unwrap().level()
    };
    assert_eq!(level(Category::Hero, "main-banner"), FallbackLevel::Secondary);
    assert_eq!(level(Category::Services, "deep-cleaning"), FallbackLevel::Primary);
    assert_eq!(level(Category::Services, "carpet-care"), FallbackLevel::Placeholder);
    assert_eq!(level(Category::Backgrounds, "sparkle"), FallbackLevel::Placeholder);

    let snapshot = s.stats().snapshot();
    assert_eq!(snapshot["hero/main-banner"].levels_observed, vec![0]);
    assert_eq!(snapshot["services/carpet-care"].levels_observed, vec![0, 1]);
    assert_eq!(snapshot["backgrounds/sparkle"].levels_observed, vec![0]);
    assert!(!snapshot.contains_key("services/deep-cleaning"));

    let report = s.report();
    assert_eq!(report.len(), 4);
    assert_eq!(report.iter().filter(|r| r.loaded).count(), 2);
}

#[test]
fn rendered_state_follows_the_chain() {
    let mut s = session(true, ObserverSupport::Available);
    let loader = RecordingLoader::default();
    let h = s.mount(Category::Hero, "main-banner", BuildOptions::default(), &loader);

    let html = s.render(h.id()).unwrap().into_string();
    assert!(html.contains(r#"data-fallback-level="2""#));
    assert!(html.contains("fallback-secondary"));
    assert!(html.contains("fallback-tertiary"));
    assert!(html.contains("has-placeholder"));
    assert!(html.contains(" hidden"));

    h.on_error(&mut s);
    let html = s.render(h.id()).unwrap().into_string();
    assert!(html.contains(r#"data-fallback-level="3""#));
    assert!(html.contains("image-failed"));
    assert!(html.contains("Image unavailable"));
    assert!(!html.contains("has-placeholder"));
}
