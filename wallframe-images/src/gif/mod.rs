//! GIF image decoding.
//!
//! Supports GIF87a and GIF89a streams:
//!
//! - LZW decompression
//! - Animation with per-frame delays and disposal methods
//! - Transparency through the graphic control extension
//! - Interlaced image blocks
//! - Local and global color tables
//!
//! Every image block produces one fully composited frame covering the whole
//! logical screen.

mod canvas;
mod decoder;
pub mod lzw;

pub use canvas::{BlockRect, Canvas};
pub use decoder::{deinterlace, GifDecoder, INTERLACE_PASSES};

use crate::error::{ImageError, Result};
use wallframe_core::ByteReader;

/// GIF87a file signature.
pub const GIF87A_SIGNATURE: &[u8; 6] = b"GIF87a";
/// GIF89a file signature.
pub const GIF89A_SIGNATURE: &[u8; 6] = b"GIF89a";

/// Extension introducer byte.
pub const EXTENSION_INTRODUCER: u8 = 0x21;
/// Image separator byte.
pub const IMAGE_SEPARATOR: u8 = 0x2C;
/// File trailer byte.
pub const TRAILER: u8 = 0x3B;

/// Graphic control extension label.
pub const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;

/// Check for either GIF signature.
pub fn is_gif_signature(data: &[u8]) -> bool {
    data.len() >= 6 && (&data[..6] == GIF87A_SIGNATURE || &data[..6] == GIF89A_SIGNATURE)
}

/// GIF frame disposal method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// No disposal specified.
    #[default]
    None,
    /// Do not dispose.
    Keep,
    /// Restore to background color.
    RestoreBackground,
    /// Restore to previous frame.
    RestorePrevious,
}

impl DisposalMethod {
    /// Parse disposal method from the graphic control packed byte.
    ///
    /// Reserved values 4-7 leave the canvas as drawn.
    pub fn from_byte(byte: u8) -> Self {
        match (byte >> 2) & 0x07 {
            1 => DisposalMethod::Keep,
            2 => DisposalMethod::RestoreBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::None,
        }
    }
}

/// GIF logical screen descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalScreenDescriptor {
    /// Canvas width.
    pub width: u16,
    /// Canvas height.
    pub height: u16,
    /// Has global color table.
    pub has_global_color_table: bool,
    /// Size of global color table (2^(n+1) entries).
    pub global_color_table_size: u8,
    /// Background color index.
    pub background_color_index: u8,
}

impl LogicalScreenDescriptor {
    /// Read the 7-byte descriptor that follows the signature.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        let [flags, background_color_index, _aspect_ratio] = reader.read_array()?;

        Ok(Self {
            width,
            height,
            has_global_color_table: flags & 0x80 != 0,
            global_color_table_size: flags & 0x07,
            background_color_index,
        })
    }

    /// Number of entries in the global color table, zero if absent.
    pub fn global_color_table_len(&self) -> usize {
        if self.has_global_color_table {
            1 << (self.global_color_table_size + 1)
        } else {
            0
        }
    }
}

/// State carried by the most recent graphic control extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicControl {
    /// Disposal applied after the next image block.
    pub disposal: DisposalMethod,
    /// Palette index skipped while compositing.
    pub transparent_index: Option<u8>,
    /// Frame duration in milliseconds, always positive.
    pub delay_ms: u32,
}

impl GraphicControl {
    /// Control state before any extension has been seen.
    pub fn with_default_delay(default_delay_ms: u32) -> Self {
        Self {
            disposal: DisposalMethod::None,
            transparent_index: None,
            delay_ms: default_delay_ms,
        }
    }

    /// Read a graphic control extension body (after the label byte).
    ///
    /// A zero delay is replaced by `default_delay_ms`.
    pub fn parse(reader: &mut ByteReader<'_>, default_delay_ms: u32) -> Result<Self> {
        let block_size = reader.read_u8()?;
        if block_size != 4 {
            return Err(ImageError::MalformedGif(format!(
                "graphic control block size {block_size}, expected 4"
            )));
        }

        let flags = reader.read_u8()?;
        let delay_cs = reader.read_u16_le()?;
        let transparent_index = reader.read_u8()?;

        match reader.read_u8() {
            Ok(0) => {}
            Ok(other) => {
                return Err(ImageError::MalformedGif(format!(
                    "graphic control terminator {other:#04x}"
                )))
            }
            Err(_) => {
                return Err(ImageError::MalformedGif(
                    "missing graphic control terminator".into(),
                ))
            }
        }

        let delay_ms = match delay_cs as u32 * 10 {
            0 => default_delay_ms,
            ms => ms,
        };

        Ok(Self {
            disposal: DisposalMethod::from_byte(flags),
            transparent_index: (flags & 0x01 != 0).then_some(transparent_index),
            delay_ms,
        })
    }
}

/// Image descriptor that introduces each image block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Placement and size on the logical screen.
    pub rect: BlockRect,
    /// Has local color table.
    pub has_local_color_table: bool,
    /// Rows are stored in interlaced order.
    pub interlaced: bool,
    /// Size of local color table (2^(n+1) entries).
    pub local_color_table_size: u8,
}

impl ImageDescriptor {
    /// Read the 9-byte descriptor that follows the image separator.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let left = reader.read_u16_le()?;
        let top = reader.read_u16_le()?;
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        let flags = reader.read_u8()?;

        Ok(Self {
            rect: BlockRect {
                left,
                top,
                width,
                height,
            },
            has_local_color_table: flags & 0x80 != 0,
            interlaced: flags & 0x40 != 0,
            local_color_table_size: flags & 0x07,
        })
    }

    /// Number of entries in the local color table, zero if absent.
    pub fn local_color_table_len(&self) -> usize {
        if self.has_local_color_table {
            1 << (self.local_color_table_size + 1)
        } else {
            0
        }
    }
}
