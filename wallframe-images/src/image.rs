//! Core image types.

use crate::error::{ImageError, Result};

/// Pack channels into an ARGB32 value (A in the most significant byte).
#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Opaque black, used when no background color can be resolved.
pub const OPAQUE_BLACK: u32 = pack_argb(0xFF, 0, 0, 0);

/// A single fully composited frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Display duration in milliseconds, always positive.
    duration_ms: u32,
    /// Row-major ARGB32 pixels.
    pixels: Vec<u32>,
}

impl Frame {
    /// Create a frame. A zero duration is raised to 1 ms.
    pub fn new(duration_ms: u32, pixels: Vec<u32>) -> Self {
        Self {
            duration_ms: duration_ms.max(1),
            pixels,
        }
    }

    /// Get display duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Get pixel data.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Get a pixel given the owning image's width.
    pub fn pixel(&self, x: u32, y: u32, width: u32) -> Option<u32> {
        if x >= width {
            return None;
        }
        self.pixels
            .get(y as usize * width as usize + x as usize)
            .copied()
    }

    /// Serialize pixels as big-endian ARGB32 bytes.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }
}

/// A decoded image: dimensions plus one or more frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image width.
    width: u32,
    /// Image height.
    height: u32,
    /// Frames in display order.
    frames: Vec<Frame>,
}

impl Image {
    /// Create an image, checking that dimensions are non-zero, that at least
    /// one frame exists and that every frame holds `width * height` pixels.
    pub fn new(width: u32, height: u32, frames: Vec<Frame>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        if frames.is_empty() {
            return Err(ImageError::NoFrames);
        }

        let expected = width as usize * height as usize;
        if let Some(frame) = frames.iter().find(|f| f.pixels.len() != expected) {
            return Err(ImageError::FrameSizeMismatch {
                expected,
                actual: frame.pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            frames,
        })
    }

    /// Get image width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get image height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get all frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Get a frame by index.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Consume the image and return its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Check if the image has more than one frame.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Sum of all frame durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms as u64).sum()
    }
}

/// A color table of up to 256 ARGB32 entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<u32>,
}

impl Palette {
    /// Build an opaque palette from packed RGB triples.
    pub fn from_rgb_triples(raw: &[u8]) -> Result<Self> {
        if raw.len() % 3 != 0 {
            return Err(ImageError::MalformedGif(format!(
                "palette length {} is not a multiple of 3",
                raw.len()
            )));
        }
        if raw.len() > 256 * 3 {
            return Err(ImageError::MalformedGif(format!(
                "palette of {} entries exceeds 256",
                raw.len() / 3
            )));
        }

        let entries = raw
            .chunks_exact(3)
            .map(|rgb| pack_argb(0xFF, rgb[0], rgb[1], rgb[2]))
            .collect();
        Ok(Self { entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry without failing.
    pub fn get(&self, index: u8) -> Option<u32> {
        self.entries.get(index as usize).copied()
    }

    /// Look up an entry, failing when the index is out of range.
    #[inline]
    pub fn resolve(&self, index: u8) -> Result<u32> {
        self.get(index).ok_or(ImageError::PaletteIndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }
}
