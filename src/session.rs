//! Image session: the context object that owns one page's image state.
//!
//! A session holds the metadata store, the format negotiator, the lazy-load
//! scheduler, the fallback statistics and every mounted element. All image
//! operations go through it explicitly.
//!
//! ## Load path
//!
//! ```text
//! mount ──eager / no observer──▶ load
//!   │
//!   └──lazy──▶ observe ──intersection──▶ load
//!
//! load: mark loading → attempt(current source)
//!         ├─ ok   → on_success
//!         └─ err  → on_failure ── Retry(alt) → attempt(alt) once more
//!                              └─ Placeholder / Failed → stop
//! ```
//!
//! A host that delivers its own load/error events (a browser) uses the
//! [`ElementHandlers`] returned by [`ImageSession::mount`] instead of an
//! [`ImageLoader`].

use crate::config::{FallbackTable, SiteConfig};
use crate::element::ManagedElement;
use crate::fallback::{ImageElementState, Transition};
use crate::lazy::{ElementId, IntersectionEntry, LazyScheduler, Registration};
use crate::loader::ImageLoader;
use crate::metadata::MetadataStore;
use crate::negotiate::FormatNegotiator;
use crate::picture::{BuildOptions, PictureBuilder, RenderableImage};
use crate::stats::StatsRecorder;
use crate::types::{Category, ImageKey, LoadingMode};
use maud::{Markup, PreEscaped};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug)]
struct Mounted {
    state: ImageElementState,
    element: ManagedElement,
    sources: String,
    degraded: bool,
}

#[derive(Debug)]
pub struct ImageSession {
    store: MetadataStore,
    negotiator: FormatNegotiator,
    fallbacks: FallbackTable,
    scheduler: LazyScheduler,
    stats: StatsRecorder,
    elements: BTreeMap<ElementId, Mounted>,
    next_id: u64,
}

/// Load and error callbacks bound to one mounted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandlers {
    id: ElementId,
}

impl ElementHandlers {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn on_load(&self, session: &mut ImageSession) {
        session.succeed(self.id);
    }

    /// Deliver one failure event. A `Retry` asks the host to load the
    /// returned source next.
    pub fn on_error(&self, session: &mut ImageSession) -> Transition {
        session.fail(self.id)
    }
}

/// Final state of one mounted element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementReport {
    pub image: String,
    pub level: u8,
    pub source: String,
    pub loaded: bool,
    pub failed: bool,
    pub degraded: bool,
}

impl ImageSession {
    pub fn new(
        store: MetadataStore,
        negotiator: FormatNegotiator,
        fallbacks: FallbackTable,
        scheduler: LazyScheduler,
    ) -> Self {
        Self {
            store,
            negotiator,
            fallbacks,
            scheduler,
            stats: StatsRecorder::new(),
            elements: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn from_config(store: MetadataStore, config: &SiteConfig) -> Self {
        Self::new(
            store,
            config.formats.negotiator(),
            config.fallbacks.clone(),
            LazyScheduler::new(config.lazy.support(), config.lazy.options()),
        )
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn scheduler(&self) -> &LazyScheduler {
        &self.scheduler
    }

    pub fn builder(&self) -> PictureBuilder<'_> {
        PictureBuilder::new(&self.store, &self.negotiator, &self.fallbacks)
    }

    pub fn build(&self, category: Category, name: &str, options: BuildOptions) -> RenderableImage {
        self.builder().build(category, name, options)
    }

    /// Build an image, attach fallback state, and either load it now
    /// (eager, or no viewport observation) or register it for lazy loading.
    pub fn mount(
        &mut self,
        category: Category,
        name: &str,
        options: BuildOptions,
        loader: &impl ImageLoader,
    ) -> ElementHandlers {
        let image = self.build(category, name, options);
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            Mounted {
                state: image.initial_state(),
                element: image.initial_element(),
                sources: image.sources().into_string(),
                degraded: image.degraded,
            },
        );
        debug!(
            image = %image.key,
            element = %id,
            loading = image.loading.as_str(),
            "mounted"
        );

        match image.loading {
            LoadingMode::Eager => self.load(id, loader),
            LoadingMode::Lazy => {
                if self.scheduler.observe(id) == Registration::Immediate {
                    self.load(id, loader);
                }
            }
        }
        ElementHandlers { id }
    }

    /// Load every element the entries trigger. Returns the triggered ids.
    pub fn handle_intersections(
        &mut self,
        entries: &[IntersectionEntry],
        loader: &impl ImageLoader,
    ) -> Vec<ElementId> {
        let triggered = self.scheduler.triggered(entries);
        for &id in &triggered {
            self.load(id, loader);
        }
        triggered
    }

    /// Load everything still waiting on the viewport, as a full scroll would.
    pub fn load_pending(&mut self, loader: &impl ImageLoader) -> usize {
        let pending = self.scheduler.drain();
        for &id in &pending {
            self.load(id, loader);
        }
        pending.len()
    }

    /// Attempt the element's current source, following at most one retry
    /// per fallback transition.
    pub fn load(&mut self, id: ElementId, loader: &impl ImageLoader) {
        let Some(mounted) = self.elements.get_mut(&id) else {
            return;
        };
        if !mounted.state.wants_load() {
            return;
        }
        mounted.state.mark_loading(&mut mounted.element);
        loop {
            let source = mounted.state.current_source().to_string();
            debug!(image = %mounted.state.key(), %source, "load attempt");
            match loader.attempt(&source) {
                Ok(()) => {
                    mounted.state.on_success(&mut mounted.element);
                    break;
                }
                Err(err) => {
                    debug!(image = %mounted.state.key(), %source, %err, "load failed");
                    let transition = mounted
                        .state
                        .on_failure(&mut mounted.element, &mut self.stats);
                    if !matches!(transition, Transition::Retry(_)) {
                        break;
                    }
                }
            }
        }
    }

    fn succeed(&mut self, id: ElementId) {
        if let Some(mounted) = self.elements.get_mut(&id) {
            mounted.state.on_success(&mut mounted.element);
        }
    }

    fn fail(&mut self, id: ElementId) -> Transition {
        match self.elements.get_mut(&id) {
            Some(mounted) => mounted.state.on_failure(&mut mounted.element, &mut self.stats),
            None => Transition::Ignored,
        }
    }

    /// Unmount an element. A pending lazy registration never fires.
    pub fn remove(&mut self, id: ElementId) -> bool {
        self.scheduler.unobserve(id);
        self.elements.remove(&id).is_some()
    }

    pub fn state(&self, id: ElementId) -> Option<&ImageElementState> {
        self.elements.get(&id).map(|m| &m.state)
    }

    pub fn element(&self, id: ElementId) -> Option<&ManagedElement> {
        self.elements.get(&id).map(|m| &m.element)
    }

    /// Current markup of a mounted element.
    pub fn render(&self, id: ElementId) -> Option<Markup> {
        self.elements
            .get(&id)
            .map(|m| m.element.render_in_container(PreEscaped(m.sources.clone())))
    }

    pub fn find(&self, key: &ImageKey) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, m)| m.state.key() == key)
            .map(|(id, _)| *id)
    }

    pub fn stats(&self) -> &StatsRecorder {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn report(&self) -> Vec<ElementReport> {
        self.elements
            .values()
            .map(|m| ElementReport {
                image: m.state.key().to_string(),
                level: m.state.level().as_u8(),
                source: m.state.current_source().to_string(),
                loaded: m.state.is_loaded(),
                failed: m.state.is_failed(),
                degraded: m.degraded,
            })
            .collect()
    }
}
