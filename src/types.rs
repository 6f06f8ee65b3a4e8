//! Shared closed enumerations used across the image subsystem.
//!
//! Categories, priorities and fallback levels arrive as strings in the
//! metadata file and in rendered markup. They are parsed once at the edge
//! into these enums so every `match` in the state machine and builder is
//! exhaustive.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Page section an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Hero,
    Services,
    About,
    Reviews,
    Backgrounds,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Hero,
        Category::Services,
        Category::About,
        Category::Reviews,
        Category::Backgrounds,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hero => "hero",
            Category::Services => "services",
            Category::About => "about",
            Category::Reviews => "reviews",
            Category::Backgrounds => "backgrounds",
        }
    }

    /// Leading phrase of generated alt text (`"<phrase> - <name>"`).
    pub fn alt_phrase(self) -> &'static str {
        match self {
            Category::Hero => "Professional cleaning service",
            Category::Services => "Our services",
            Category::About => "About our team",
            Category::Reviews => "Customer review",
            Category::Backgrounds => "Decorative background",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Load priority from the metadata file. `High` images are never lazy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Value of the `loading` attribute on the terminal `<img>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingMode {
    Eager,
    Lazy,
}

impl LoadingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadingMode::Eager => "eager",
            LoadingMode::Lazy => "lazy",
        }
    }
}

/// Position in the degradation chain of one element.
///
/// Ordered so that `a < b` means `a` precedes `b` in the chain; the level
/// of an element never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FallbackLevel {
    #[default]
    Primary,
    Secondary,
    Placeholder,
    Failed,
}

impl FallbackLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            FallbackLevel::Primary => 0,
            FallbackLevel::Secondary => 1,
            FallbackLevel::Placeholder => 2,
            FallbackLevel::Failed => 3,
        }
    }

    /// Presentation class applied when an element enters this level.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            FallbackLevel::Primary => None,
            FallbackLevel::Secondary => Some("fallback-secondary"),
            FallbackLevel::Placeholder => Some("fallback-tertiary"),
            FallbackLevel::Failed => Some("fallback-final"),
        }
    }
}

impl fmt::Display for FallbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FallbackLevel::Primary => "primary",
            FallbackLevel::Secondary => "secondary",
            FallbackLevel::Placeholder => "placeholder",
            FallbackLevel::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Stable identity of an image: `category/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey {
    pub category: Category,
    pub name: String,
}

impl ImageKey {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}
