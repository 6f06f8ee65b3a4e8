//! Social preview and structured-data markup.
//!
//! Renders the metadata file's `seo` section as `og:image` / `twitter:image`
//! meta tags and a schema.org `LocalBusiness` JSON-LD block. Image paths are
//! made absolute with `seo.site_url` when one is configured.

use crate::config::SeoConfig;
use crate::loader::is_remote;
use crate::metadata::MetadataStore;
use maud::{Markup, PreEscaped, html};
use serde_json::{Value, json};

/// Prefix a site-relative path with the configured site URL.
pub fn absolute_url(site_url: &str, path: &str) -> String {
    let base = site_url.trim_end_matches('/');
    if base.is_empty() || is_remote(path) {
        return path.to_string();
    }
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Default image first, then business images, without duplicates.
fn business_images(store: &MetadataStore) -> Vec<&str> {
    let seo = store.seo();
    let mut images: Vec<&str> = Vec::new();
    for image in seo.default_image.iter().chain(&seo.business_images) {
        if !images.contains(&image.as_str()) {
            images.push(image);
        }
    }
    images
}

pub fn meta_tags(store: &MetadataStore, config: &SeoConfig) -> Markup {
    let seo = store.seo();
    html! {
        @if let Some(image) = &seo.default_image {
            @let url = absolute_url(&config.site_url, image);
            meta property="og:image" content=(url);
            meta name="twitter:card" content="summary_large_image";
            meta name="twitter:image" content=(url);
        }
    }
}

/// schema.org structured data for the business and its images.
pub fn json_ld(store: &MetadataStore, config: &SeoConfig) -> Value {
    let images: Vec<Value> = business_images(store)
        .into_iter()
        .map(|path| {
            let url = absolute_url(&config.site_url, path);
            match store.records().find(|r| r.primary_source == path) {
                Some(record) => {
                    let mut object = json!({
                        "@type": "ImageObject",
                        "contentUrl": url,
                    });
                    if let Some(title) = &record.title {
                        object["name"] = json!(title);
                    }
                    if let Some(alt) = &record.alt_text {
                        object["description"] = json!(alt);
                    }
                    if !record.keywords.is_empty() {
                        object["keywords"] = json!(record.keywords.join(", "));
                    }
                    object
                }
                None => json!(url),
            }
        })
        .collect();

    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "name": config.business_name,
        "image": images,
    });
    if !config.site_url.is_empty() {
        data["url"] = json!(config.site_url);
    }
    data
}

/// Meta tags followed by the JSON-LD `<script>`.
pub fn render(store: &MetadataStore, config: &SeoConfig) -> Markup {
    // `</` inside a script body would close it early.
    let json = json_ld(store, config).to_string().replace("</", "<\\/");
    html! {
        (meta_tags(store, config))
        script type="application/ld+json" { (PreEscaped(json)) }
    }
}
