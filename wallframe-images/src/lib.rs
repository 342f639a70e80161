//! Image decoding for Wallframe.
//!
//! This crate turns PNG and GIF files into fully composited ARGB32 frames:
//! - PNG: non-interlaced, 8-bit RGB and RGBA
//! - GIF: GIF87a/GIF89a with animation, transparency and disposal
//!
//! ## Features
//!
//! - `png` - PNG decoder (default)
//! - `gif` - GIF decoder (default)
//!
//! ## Example
//!
//! ```no_run
//! use wallframe_images::{decode, DecoderConfig, decode_with_config};
//!
//! # let data: Vec<u8> = vec![];
//! let image = decode(&data)?;
//! for frame in image.frames() {
//!     println!("{} ms, {} pixels", frame.duration_ms(), frame.pixels().len());
//! }
//!
//! let config = DecoderConfig::new().with_default_frame_duration(40);
//! let image = decode_with_config(&data, &config)?;
//! # Ok::<(), wallframe_images::ImageError>(())
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod image;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "gif")]
pub mod gif;

pub use config::{DecoderConfig, DEFAULT_FRAME_DURATION_MS, DEFAULT_MAX_PIXELS};
pub use error::{ImageError, Result};
pub use image::{pack_argb, Frame, Image, Palette, OPAQUE_BLACK};

#[cfg(feature = "png")]
pub use png::PngDecoder;

#[cfg(feature = "gif")]
pub use gif::GifDecoder;

const PNG_MAGIC: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Detect image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(PNG_MAGIC) {
        return Some(ImageFormat::Png);
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }

    None
}

/// Image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// GIF image.
    Gif,
}

impl ImageFormat {
    /// Get file extension for format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    /// Get MIME type for format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Check if format can carry more than one frame.
    pub fn supports_animation(&self) -> bool {
        matches!(self, ImageFormat::Gif)
    }
}

/// Input bytes tagged with their detected format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// PNG file bytes.
    Png(&'a [u8]),
    /// GIF file bytes.
    Gif(&'a [u8]),
}

impl<'a> ImageSource<'a> {
    /// Tag `data` by its signature.
    pub fn detect(data: &'a [u8]) -> Result<Self> {
        match detect_format(data) {
            Some(ImageFormat::Png) => Ok(ImageSource::Png(data)),
            Some(ImageFormat::Gif) => Ok(ImageSource::Gif(data)),
            None => Err(ImageError::UnsupportedFormat),
        }
    }

    /// Format of the source.
    pub fn format(&self) -> ImageFormat {
        match self {
            ImageSource::Png(_) => ImageFormat::Png,
            ImageSource::Gif(_) => ImageFormat::Gif,
        }
    }

    /// Run the matching decoder.
    #[cfg_attr(
        not(all(feature = "png", feature = "gif")),
        allow(unused_variables)
    )]
    pub fn decode(self, config: &DecoderConfig) -> Result<Image> {
        match self {
            #[cfg(feature = "png")]
            ImageSource::Png(data) => PngDecoder::with_config(config.clone()).decode(data),
            #[cfg(feature = "gif")]
            ImageSource::Gif(data) => GifDecoder::with_config(config.clone()).decode(data),
            #[allow(unreachable_patterns)]
            _ => Err(ImageError::UnsupportedFormat),
        }
    }
}

/// Decode a PNG or GIF file with the default configuration.
pub fn decode(data: &[u8]) -> Result<Image> {
    decode_with_config(data, &DecoderConfig::default())
}

/// Decode a PNG or GIF file.
pub fn decode_with_config(data: &[u8], config: &DecoderConfig) -> Result<Image> {
    ImageSource::detect(data)?.decode(config)
}
