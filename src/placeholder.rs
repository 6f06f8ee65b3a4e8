//! Synthesized stand-ins for images that could not be loaded.
//!
//! Two pieces of markup, both inserted into the image's container by the
//! fallback state machine:
//!
//! - a **placeholder** (level 2): category icon, short label, and a
//!   category gradient so the layout keeps its visual weight;
//! - an **error indicator** (level 3): a warning glyph and "unavailable".

use crate::types::Category;
use maud::{Markup, html};

struct CategoryLook {
    icon: &'static str,
    label: &'static str,
    gradient: (&'static str, &'static str),
}

fn look(category: Category) -> CategoryLook {
    match category {
        Category::Hero => CategoryLook {
            icon: "\u{2728}",
            label: "Sparkling clean spaces",
            gradient: ("#4f9dde", "#2c6fa8"),
        },
        Category::Services => CategoryLook {
            icon: "\u{1F9F9}",
            label: "Our services",
            gradient: ("#5cb85c", "#3d8b3d"),
        },
        Category::About => CategoryLook {
            icon: "\u{1F465}",
            label: "Our team",
            gradient: ("#f0ad4e", "#c77c11"),
        },
        Category::Reviews => CategoryLook {
            icon: "\u{2B50}",
            label: "Happy customers",
            gradient: ("#9b59b6", "#6c3483"),
        },
        Category::Backgrounds => CategoryLook {
            icon: "\u{25A7}",
            label: "Background",
            gradient: ("#e9ecef", "#ced4da"),
        },
    }
}

/// Inline `background` value for a category's placeholder.
pub fn gradient(category: Category) -> String {
    let (from, to) = look(category).gradient;
    format!("linear-gradient(135deg, {from} 0%, {to} 100%)")
}

pub fn placeholder(category: Category, alt: &str) -> Markup {
    let look = look(category);
    let style = format!("background: {};", gradient(category));
    html! {
        div
            class={ "image-placeholder placeholder-" (category.as_str()) }
            style=(style)
            role="img"
            aria-label=(alt)
        {
            span.placeholder-icon aria-hidden="true" { (look.icon) }
            span.placeholder-label { (look.label) }
        }
    }
}

pub fn error_indicator() -> Markup {
    html! {
        div.image-error role="img" aria-label="Image unavailable" {
            span.error-icon aria-hidden="true" { "\u{26A0}" }
            span.error-label { "Image unavailable" }
        }
    }
}
