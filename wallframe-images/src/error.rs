//! Image decoding error types.

use thiserror::Error;
use wallframe_core::{BitstreamError, Error as CoreError};

/// Image decoding errors.
///
/// Every failure is terminal for the decode call that produced it; no partial
/// image is ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The data starts with neither a PNG nor a GIF signature.
    #[error("Unsupported format: not a PNG or GIF file")]
    UnsupportedFormat,

    /// The PNG entry point was given data without the PNG signature.
    #[error("Invalid PNG signature")]
    NotPng,

    /// The GIF entry point was given data without a GIF87a/GIF89a signature.
    #[error("Invalid GIF signature")]
    NotGif,

    /// A required field runs past the end of the buffer.
    #[error("Truncated data at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// Offset of the field.
        offset: usize,
        /// Bytes the field required.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A PNG chunk header or body runs past the end of the buffer.
    #[error("Truncated PNG chunk {chunk} at offset {offset}")]
    TruncatedChunk {
        /// Chunk type, or `"????"` when the header itself is cut short.
        chunk: String,
        /// Offset of the chunk header.
        offset: usize,
    },

    /// Header fields or filter types outside the supported PNG subset.
    #[error("Unsupported PNG: {0}")]
    UnsupportedPng(String),

    /// Inflate failed or produced an unexpected amount of data.
    #[error("Corrupt compressed data: {0}")]
    CorruptCompressedData(String),

    /// A GIF block has an invalid shape.
    #[error("Malformed GIF: {0}")]
    MalformedGif(String),

    /// The LZW stream references an undefined dictionary entry.
    #[error("Invalid LZW code {code} (next code {next_code})")]
    InvalidLzwCode {
        /// Offending code.
        code: u16,
        /// Next code the dictionary would have assigned.
        next_code: u16,
    },

    /// The GIF stream contains no image blocks.
    #[error("No frames found in GIF")]
    NoFrames,

    /// A pixel references a palette entry that does not exist.
    #[error("Color index {index} out of range for palette of {len} entries")]
    PaletteIndexOutOfRange {
        /// Referenced index.
        index: u8,
        /// Palette length.
        len: usize,
    },

    /// Zero width or height.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// A frame's pixel buffer does not cover `width * height` pixels.
    #[error("Frame holds {actual} pixels, expected {expected}")]
    FrameSizeMismatch {
        /// `width * height` of the image.
        expected: usize,
        /// Pixels in the offending frame.
        actual: usize,
    },

    /// Dimensions exceed the configured pixel limit.
    #[error("Dimensions {width}x{height} exceed limit of {max_pixels} pixels")]
    DimensionsExceeded {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Configured limit.
        max_pixels: u64,
    },
}

/// Image decoding result type.
pub type Result<T> = std::result::Result<T, ImageError>;

impl From<BitstreamError> for ImageError {
    fn from(err: BitstreamError) -> Self {
        match err {
            BitstreamError::UnexpectedEnd {
                offset,
                needed,
                available,
            } => ImageError::TruncatedInput {
                offset,
                needed,
                available,
            },
        }
    }
}

impl From<CoreError> for ImageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Bitstream(err) => err.into(),
            // Readers are only ever called with valid widths.
            CoreError::InvalidParameter(msg) => ImageError::MalformedGif(msg),
        }
    }
}

impl ImageError {
    /// Check if the error was caused by data ending early.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            ImageError::TruncatedInput { .. } | ImageError::TruncatedChunk { .. }
        )
    }
}
