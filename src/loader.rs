//! Image load attempts.
//!
//! [`ImageLoader`] is the seam between the load path and whatever actually
//! fetches bytes. A browser host maps it onto `<img>` load/error events;
//! [`FsLoader`] resolves site-relative URIs under a directory and verifies
//! the file decodes, which is what the `check` command audits a built site
//! with.
//!
//! Formats the `image` crate is built to read (JPEG, PNG, GIF, WebP) must
//! decode. Other image types a page may reference (SVG, AVIF) are checked
//! for existence only.

use crate::picture::mime_for;
use image::ImageFormat;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("not a decodable image: {path}: {reason}")]
    Undecodable { path: PathBuf, reason: String },
    #[error("empty source")]
    EmptySource,
    #[error("source escapes the site root: {0}")]
    OutsideRoot(String),
}

/// One load attempt for a source URI.
pub trait ImageLoader {
    fn attempt(&self, source: &str) -> Result<(), LoadError>;
}

/// Loads from a built site directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a URI to a path under the root. Query strings and fragments are
    /// dropped, percent-escapes decoded, and `..` segments refused.
    pub fn resolve(&self, source: &str) -> Result<PathBuf, LoadError> {
        let raw = source.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent_decode_str(raw).decode_utf8_lossy();
        let path = decoded.trim_start_matches('/');
        if path.is_empty() {
            return Err(LoadError::EmptySource);
        }
        if path.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(LoadError::OutsideRoot(source.to_string()));
        }
        Ok(self.root.join(path))
    }
}

fn verify(path: &Path) -> Result<(), LoadError> {
    match ImageFormat::from_path(path) {
        Ok(format) if format.reading_enabled() => {
            image::image_dimensions(path).map_err(|e| LoadError::Undecodable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        _ if mime_for(&path.to_string_lossy()).is_some() => {
            debug!(path = %path.display(), "format not decoded; present on disk");
            Ok(())
        }
        _ => Err(LoadError::Undecodable {
            path: path.to_path_buf(),
            reason: "unrecognized image format".to_string(),
        }),
    }
}

/// Remote and inline sources can't be verified offline.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://")
        || source.starts_with("https://")
        || source.starts_with("//")
        || source.starts_with("data:")
}

impl ImageLoader for FsLoader {
    fn attempt(&self, source: &str) -> Result<(), LoadError> {
        if is_remote(source) {
            debug!(source, "remote source assumed reachable");
            return Ok(());
        }
        let path = self.resolve(source)?;
        if !path.is_file() {
            return Err(LoadError::NotFound(path));
        }
        verify(&path)
    }
}
