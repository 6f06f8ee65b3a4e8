//! Per-element fallback state machine.
//!
//! ```text
//! Primary(0) ──fail──▶ Secondary(1) ──fail──▶ Placeholder(2) ──fail──▶ Failed(3)
//!     │                                            ▲                    (absorbing)
//!     └──fail, no distinct alternate───────────────┘
//! ```
//!
//! Each failure event moves an element forward by one state, except from
//! `Primary` when there is no alternate source distinct from the one that
//! just failed: then it goes straight to `Placeholder`. It never re-enters
//! the failure path for the same state, so a misconfigured alternate cannot
//! loop.
//!
//! Every transition records the pre-transition level in the
//! [`StatsRecorder`].
//!
//! Success is a separate path: any successful load marks the element
//! loaded and clears the placeholder and failure presentation, whatever
//! level it reached. A success at `Secondary` stays at `Secondary`.
//!
//! `loaded` and `failed` are mutually exclusive terminal flags. Once either
//! is set the level is frozen; failure events are ignored from then on.

use crate::element::ElementSurface;
use crate::placeholder;
use crate::stats::StatsRecorder;
use crate::types::{FallbackLevel, ImageKey};
use tracing::debug;

pub const LOADING_CLASS: &str = "loading";
pub const LOADED_CLASS: &str = "loaded";
pub const PLACEHOLDER_CONTAINER_CLASS: &str = "has-placeholder";
pub const FAILED_CONTAINER_CLASS: &str = "image-failed";
pub const LEVEL_ATTRIBUTE: &str = "data-fallback-level";

/// Outcome of one failure event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Now at `Secondary`; load this source next.
    Retry(String),
    /// Now at `Placeholder`; no further network load.
    Placeholder,
    /// Now at `Failed`.
    Failed,
    /// Terminal already; nothing changed.
    Ignored,
}

/// Fallback progress of one rendered image element.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElementState {
    key: ImageKey,
    level: FallbackLevel,
    current_source: String,
    alternate_source: Option<String>,
    alt_text: String,
    loading: bool,
    loaded: bool,
    failed: bool,
}

impl ImageElementState {
    pub fn new(
        key: ImageKey,
        source: impl Into<String>,
        alternate_source: Option<String>,
        alt_text: impl Into<String>,
    ) -> Self {
        Self {
            key,
            level: FallbackLevel::Primary,
            current_source: source.into(),
            alternate_source,
            alt_text: alt_text.into(),
            loading: false,
            loaded: false,
            failed: false,
        }
    }

    pub fn key(&self) -> &ImageKey {
        &self.key
    }

    pub fn level(&self) -> FallbackLevel {
        self.level
    }

    pub fn current_source(&self) -> &str {
        &self.current_source
    }

    pub fn alternate_source(&self) -> Option<&str> {
        self.alternate_source.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.loaded || self.failed
    }

    /// Whether another network load makes sense for this element.
    pub fn wants_load(&self) -> bool {
        !self.is_terminal() && self.level < FallbackLevel::Placeholder
    }

    pub fn mark_loading(&mut self, surface: &mut impl ElementSurface) {
        self.loading = true;
        surface.add_class(LOADING_CLASS);
    }

    /// Advance one step in response to a failed load.
    pub fn on_failure(
        &mut self,
        surface: &mut impl ElementSurface,
        stats: &mut StatsRecorder,
    ) -> Transition {
        if self.is_terminal() || self.level == FallbackLevel::Failed {
            return Transition::Ignored;
        }
        let from = self.level;
        stats.record(self.key.category, &self.key.name, from);

        let transition = match from {
            FallbackLevel::Primary => match self.distinct_alternate() {
                Some(alternate) => self.enter_secondary(alternate, surface),
                None => self.enter_placeholder(surface),
            },
            FallbackLevel::Secondary => self.enter_placeholder(surface),
            FallbackLevel::Placeholder => self.enter_failed(surface),
            FallbackLevel::Failed => return Transition::Ignored,
        };
        debug!(image = %self.key, %from, to = %self.level, "fallback transition");
        transition
    }

    /// Mark a successful load at whatever level the element reached.
    pub fn on_success(&mut self, surface: &mut impl ElementSurface) {
        self.loaded = true;
        self.failed = false;
        self.loading = false;
        surface.remove_class(LOADING_CLASS);
        for level in [FallbackLevel::Placeholder, FallbackLevel::Failed] {
            if let Some(class) = level.css_class() {
                surface.remove_class(class);
            }
        }
        surface.add_class(LOADED_CLASS);
        surface.set_hidden(false);
        surface.remove_container_class(PLACEHOLDER_CONTAINER_CLASS);
        surface.remove_container_class(FAILED_CONTAINER_CLASS);
        surface.clear_container_insert();
        debug!(image = %self.key, level = %self.level, "image loaded");
    }

    fn distinct_alternate(&self) -> Option<String> {
        self.alternate_source
            .as_deref()
            .filter(|alt| *alt != self.current_source)
            .map(String::from)
    }

    fn set_level(&mut self, level: FallbackLevel, surface: &mut impl ElementSurface) {
        self.level = level;
        surface.set_attribute(LEVEL_ATTRIBUTE, &level.as_u8().to_string());
        if let Some(class) = level.css_class() {
            surface.add_class(class);
        }
    }

    fn enter_secondary(
        &mut self,
        alternate: String,
        surface: &mut impl ElementSurface,
    ) -> Transition {
        self.set_level(FallbackLevel::Secondary, surface);
        self.current_source = alternate.clone();
        surface.set_source(&alternate);
        Transition::Retry(alternate)
    }

    fn enter_placeholder(&mut self, surface: &mut impl ElementSurface) -> Transition {
        self.set_level(FallbackLevel::Placeholder, surface);
        self.loading = false;
        surface.remove_class(LOADING_CLASS);
        surface.set_hidden(true);
        surface.add_container_class(PLACEHOLDER_CONTAINER_CLASS);
        surface.insert_into_container(placeholder::placeholder(self.key.category, &self.alt_text));
        Transition::Placeholder
    }

    fn enter_failed(&mut self, surface: &mut impl ElementSurface) -> Transition {
        self.set_level(FallbackLevel::Failed, surface);
        self.failed = true;
        self.loading = false;
        surface.remove_class(LOADING_CLASS);
        surface.set_hidden(true);
        surface.remove_container_class(PLACEHOLDER_CONTAINER_CLASS);
        surface.add_container_class(FAILED_CONTAINER_CLASS);
        surface.insert_into_container(placeholder::error_indicator());
        Transition::Failed
    }
}
