//! Decoder configuration.

/// Default duration for a static image or a GIF frame without a delay.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Default upper bound on `width * height`.
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 26;

/// Decoder configuration shared by the PNG and GIF decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Duration given to a PNG frame, and to GIF frames whose delay is zero or
    /// unspecified.
    pub default_frame_duration_ms: u32,
    /// Largest accepted `width * height`, checked before any pixel buffer is
    /// allocated.
    pub max_pixels: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            default_frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default frame duration. Zero is raised to 1 ms.
    pub fn with_default_frame_duration(mut self, duration_ms: u32) -> Self {
        self.default_frame_duration_ms = duration_ms.max(1);
        self
    }

    /// Set the pixel limit.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Reject zero dimensions and dimensions over the pixel limit.
    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(crate::ImageError::InvalidDimensions { width, height });
        }
        if width as u64 * height as u64 > self.max_pixels {
            return Err(crate::ImageError::DimensionsExceeded {
                width,
                height,
                max_pixels: self.max_pixels,
            });
        }
        Ok(())
    }
}
