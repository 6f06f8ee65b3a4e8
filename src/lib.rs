//! # Picture Fallback
//!
//! Image delivery for a small business website: every image is offered in
//! the best format the runtime can decode, loaded only when it nears the
//! viewport, and degraded step by step when a source fails, so a broken
//! image never leaves a hole in the page.
//!
//! # Architecture
//!
//! ```text
//! images.json ─▶ MetadataStore ─▶ PictureBuilder ─▶ RenderableImage
//!                                     ▲                  │ mount
//!                      FormatNegotiator                  ▼
//!                                                  ImageSession
//!                                     LazyScheduler ◀────┤
//!                                                        │ load / error
//!                                                        ▼
//!                                     ImageElementState (fallback FSM)
//!                                                        │
//!                                                        ▼
//!                                                  StatsRecorder
//! ```
//!
//! Each mounted image walks the chain
//! `primary → secondary → placeholder → failed`, one step per failed load,
//! and stops at the first success.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | JSON metadata file → immutable store; empty skeleton when unreadable |
//! | [`negotiate`] | One-time WebP capability probe, cached per negotiator |
//! | [`lazy`] | Viewport-proximity scheduling; eager loading without observation |
//! | [`fallback`] | Per-element fallback state machine |
//! | [`picture`] | Builds `<picture>` units: candidates, alternate, alt text, loading mode |
//! | [`session`] | Context object owning one page's store, scheduler, stats and mounted elements |
//! | [`element`] | Presentation-tree seam and its in-memory implementation |
//! | [`placeholder`] | Category placeholders and the error indicator |
//! | [`stats`] | Per-image fallback statistics |
//! | [`loader`] | Load-attempt seam and the filesystem loader used for audits |
//! | [`seo`] | Social preview meta tags and schema.org JSON-LD |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`naming`] | Readable names and generated alt text |
//! | [`types`] | Shared closed enumerations |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Session, No Globals
//!
//! All mutable image state lives in an [`session::ImageSession`] that callers
//! hold and pass around. Each mounted element gets its own
//! [`session::ElementHandlers`] rather than one page-wide error listener, so
//! handlers can never act on an element they were not bound to.
//!
//! ## Never Fatal
//!
//! A missing metadata file, a missing record, and a source that will not
//! load are all expected conditions. They are logged and absorbed into the
//! fallback chain; none of them is an `Err` at the session level.
//!
//! ## Single-Threaded
//!
//! Loads for one element are strictly sequential and everything runs on one
//! thread. The only interior mutability is the negotiator's cached probe.

pub mod config;
pub mod element;
pub mod fallback;
pub mod lazy;
pub mod loader;
pub mod metadata;
pub mod naming;
pub mod negotiate;
pub mod output;
pub mod picture;
pub mod placeholder;
pub mod seo;
pub mod session;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
