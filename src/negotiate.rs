//! Modern image format negotiation.
//!
//! The question "can this runtime decode WebP?" is answered once per
//! negotiator by a [`FormatProbe`]. The default [`EncoderProbe`] encodes a
//! 1×1 synthetic pixel with the `image` crate's WebP encoder and inspects
//! the container signature of the result. An encoder that is missing or
//! produces something other than a `RIFF....WEBP` stream means no support.
//! That is a valid answer, never an error.

use image::ExtendedColorType;
use image::codecs::webp::WebPEncoder;
use std::cell::OnceCell;
use tracing::debug;

/// Capability probe for the modern image format.
pub trait FormatProbe {
    fn probe(&self) -> bool;
}

/// Probe by encoding a 1×1 image and checking the descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncoderProbe;

impl FormatProbe for EncoderProbe {
    fn probe(&self) -> bool {
        let mut buf = Vec::new();
        let pixel = [0u8, 0, 0, 255];
        let encoded = WebPEncoder::new_lossless(&mut buf).encode(
            &pixel,
            1,
            1,
            ExtendedColorType::Rgba8,
        );
        encoded.is_ok() && is_webp_descriptor(&buf)
    }
}

/// Probe with a fixed answer, for configuration overrides and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl FormatProbe for FixedProbe {
    fn probe(&self) -> bool {
        self.0
    }
}

/// `RIFF<size>WEBP` container header.
pub fn is_webp_descriptor(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

/// Caches the probe result for the negotiator's lifetime.
pub struct FormatNegotiator {
    probe: Box<dyn FormatProbe>,
    supported: OnceCell<bool>,
}

impl FormatNegotiator {
    pub fn new(probe: impl FormatProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            supported: OnceCell::new(),
        }
    }

    pub fn supports_modern_format(&self) -> bool {
        *self.supported.get_or_init(|| {
            let supported = self.probe.probe();
            debug!(supported, "probed WebP support");
            supported
        })
    }
}

impl Default for FormatNegotiator {
    fn default() -> Self {
        Self::new(EncoderProbe)
    }
}

impl std::fmt::Debug for FormatNegotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatNegotiator")
            .field("supported", &self.supported.get())
            .finish_non_exhaustive()
    }
}
