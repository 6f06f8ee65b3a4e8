//! Lazy-load scheduling.
//!
//! Elements registered with [`LazyScheduler::observe`] load only when they
//! come within the pre-emptive margin of the viewport. Intersection entries
//! are fed in by the host (a browser's observer callbacks, or
//! [`IntersectionEntry::measure`] over plain rectangles). A trigger fires at
//! most once per registration: triggered elements are deregistered.
//!
//! When the runtime has no viewport observation, every registration is
//! answered with [`Registration::Immediate`] and the caller loads right away.
//! That is slower but never leaves an image unloaded.

use std::collections::BTreeSet;

/// Opaque handle for a mounted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the runtime can observe viewport intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverSupport {
    Available,
    Unavailable,
}

/// Observer tuning: a margin around the viewport and a minimum ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Pixels added above and below the viewport.
    pub root_margin: u32,
    /// Minimum visible fraction (0.0–1.0) that counts as intersecting.
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: 50,
            threshold: 0.01,
        }
    }
}

/// Vertical extent in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub id: ElementId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    /// Compute an entry for an element against a viewport grown by the
    /// margin on both edges.
    pub fn measure(
        id: ElementId,
        element: Span,
        viewport: Span,
        options: &ObserverOptions,
    ) -> Self {
        let margin = f64::from(options.root_margin);
        let root_top = viewport.top - margin;
        let root_bottom = viewport.bottom() + margin;
        let overlap = (element.bottom().min(root_bottom) - element.top.max(root_top)).max(0.0);
        let intersection_ratio = if element.height > 0.0 {
            (overlap / element.height).min(1.0)
        } else if element.top >= root_top && element.top <= root_bottom {
            1.0
        } else {
            0.0
        };
        Self {
            id,
            is_intersecting: intersection_ratio > 0.0,
            intersection_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Wait for an intersection trigger.
    Deferred,
    /// No observation available; load now.
    Immediate,
}

#[derive(Debug)]
pub struct LazyScheduler {
    support: ObserverSupport,
    options: ObserverOptions,
    observed: BTreeSet<ElementId>,
}

impl LazyScheduler {
    pub fn new(support: ObserverSupport, options: ObserverOptions) -> Self {
        Self {
            support,
            options,
            observed: BTreeSet::new(),
        }
    }

    pub fn observe(&mut self, id: ElementId) -> Registration {
        match self.support {
            ObserverSupport::Available => {
                self.observed.insert(id);
                Registration::Deferred
            }
            ObserverSupport::Unavailable => Registration::Immediate,
        }
    }

    /// Returns whether the element was registered.
    pub fn unobserve(&mut self, id: ElementId) -> bool {
        self.observed.remove(&id)
    }

    pub fn is_observed(&self, id: ElementId) -> bool {
        self.observed.contains(&id)
    }

    pub fn pending(&self) -> usize {
        self.observed.len()
    }

    /// Elements to load for this batch of entries, deregistered.
    pub fn triggered(&mut self, entries: &[IntersectionEntry]) -> Vec<ElementId> {
        let threshold = self.options.threshold;
        entries
            .iter()
            .filter(|e| e.is_intersecting && e.intersection_ratio >= threshold)
            .filter_map(|e| self.observed.remove(&e.id).then_some(e.id))
            .collect()
    }

    /// Deregister and return everything still pending, in registration-id order.
    pub fn drain(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.observed).into_iter().collect()
    }
}
