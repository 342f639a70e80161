//! PNG image decoding.
//!
//! Supports the non-interlaced, 8-bit truecolor subset of PNG:
//! - RGB (color type 2) and RGBA (color type 6)
//! - All five row filters
//! - IDAT payloads split across any number of chunks

mod decoder;
mod filter;

pub use decoder::PngDecoder;
pub use filter::{paeth_predictor, unfilter_row, FilterType};

use std::fmt;

use crate::error::{ImageError, Result};
use wallframe_core::ByteReader;

/// PNG signature bytes.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Size of the IHDR payload.
pub const IHDR_LENGTH: usize = 13;

/// PNG color type, restricted to the decodable subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// RGB.
    Rgb = 2,
    /// RGBA.
    Rgba = 6,
}

impl ColorType {
    /// Create color type from value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            2 => Some(ColorType::Rgb),
            6 => Some(ColorType::Rgba),
            _ => None,
        }
    }

    /// Bytes per pixel at 8 bits per channel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }

    /// Check if color type has alpha.
    pub fn has_alpha(&self) -> bool {
        matches!(self, ColorType::Rgba)
    }
}

/// PNG chunk type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkType([u8; 4]);

impl ChunkType {
    /// IHDR - Image header.
    pub const IHDR: Self = Self(*b"IHDR");
    /// IDAT - Image data.
    pub const IDAT: Self = Self(*b"IDAT");
    /// IEND - Image end.
    pub const IEND: Self = Self(*b"IEND");

    /// Create a chunk type from bytes.
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// Parsed and validated IHDR fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngHeader {
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Color type.
    pub color_type: ColorType,
}

impl PngHeader {
    /// Parse an IHDR payload. Fields outside the supported subset fail with
    /// [`ImageError::UnsupportedPng`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let width = reader.read_u32_be()?;
        let height = reader.read_u32_be()?;
        let [bit_depth, color_type, compression, filter, interlace] = reader.read_array()?;

        if compression != 0 || filter != 0 || interlace != 0 {
            return Err(ImageError::UnsupportedPng(format!(
                "compression {compression}, filter {filter}, interlace {interlace}"
            )));
        }
        if bit_depth != 8 {
            return Err(ImageError::UnsupportedPng(format!("bit depth {bit_depth}")));
        }
        let color_type = ColorType::from_u8(color_type)
            .ok_or_else(|| ImageError::UnsupportedPng(format!("color type {color_type}")))?;

        Ok(Self {
            width,
            height,
            color_type,
        })
    }

    /// Bytes in one unfiltered row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.color_type.bytes_per_pixel()
    }

    /// Expected size of the inflated stream: every row plus its filter byte.
    pub fn expected_data_len(&self) -> usize {
        (self.stride() + 1) * self.height as usize
    }
}
