//! GIF decoder implementation.

use tracing::{debug, trace};
use wallframe_core::ByteReader;

use super::canvas::Canvas;
use super::lzw;
use super::{
    is_gif_signature, DisposalMethod, GraphicControl, ImageDescriptor,
    LogicalScreenDescriptor, EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL, IMAGE_SEPARATOR,
    TRAILER,
};
use crate::config::DecoderConfig;
use crate::error::{ImageError, Result};
use crate::image::{Frame, Image, Palette, OPAQUE_BLACK};

/// Interlace passes as `(first_row, row_step)`, in storage order.
pub const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// GIF decoder.
///
/// Holds configuration only; the canvas and palettes live for one call to
/// [`GifDecoder::decode`].
#[derive(Debug, Clone, Default)]
pub struct GifDecoder {
    config: DecoderConfig,
}

impl GifDecoder {
    /// Create a new GIF decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new GIF decoder with custom configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Get the decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode every image block into a composited frame.
    pub fn decode(&self, data: &[u8]) -> Result<Image> {
        if !is_gif_signature(data) {
            return Err(ImageError::NotGif);
        }

        let mut reader = ByteReader::with_position(data, 6);
        let screen = LogicalScreenDescriptor::parse(&mut reader)?;
        let (width, height) = (screen.width as u32, screen.height as u32);
        self.config.check_dimensions(width, height)?;

        let global_palette = if screen.has_global_color_table {
            Some(read_palette(&mut reader, screen.global_color_table_len())?)
        } else {
            None
        };

        let background = global_palette
            .as_ref()
            .and_then(|p| p.get(screen.background_color_index))
            .unwrap_or(OPAQUE_BLACK);

        let mut canvas = Canvas::new(width, height, background);
        // Graphic control state persists until the next extension replaces it.
        let mut control = GraphicControl::with_default_delay(self.config.default_frame_duration_ms);
        let mut frames = Vec::new();

        while !reader.is_eof() {
            let offset = reader.position();
            match reader.read_u8()? {
                TRAILER => break,
                EXTENSION_INTRODUCER => {
                    let label = reader.read_u8()?;
                    if label == GRAPHIC_CONTROL_LABEL {
                        control =
                            GraphicControl::parse(&mut reader, self.config.default_frame_duration_ms)?;
                        trace!(offset, ?control, "GIF graphic control");
                    } else {
                        reader.skip_sub_blocks()?;
                        trace!(offset, label, "GIF extension skipped");
                    }
                }
                IMAGE_SEPARATOR => {
                    let frame =
                        self.decode_block(&mut reader, &mut canvas, global_palette.as_ref(), &control)?;
                    frames.push(frame);
                }
                other => {
                    return Err(ImageError::MalformedGif(format!(
                        "unknown block introducer {other:#04x} at offset {offset}"
                    )));
                }
            }
        }

        if frames.is_empty() {
            return Err(ImageError::NoFrames);
        }

        debug!(width, height, frames = frames.len(), "Decoded GIF");
        Image::new(width, height, frames)
    }

    /// Decode one image block, composite it and apply its disposal.
    fn decode_block(
        &self,
        reader: &mut ByteReader<'_>,
        canvas: &mut Canvas,
        global_palette: Option<&Palette>,
        control: &GraphicControl,
    ) -> Result<Frame> {
        let descriptor = ImageDescriptor::parse(reader)?;
        let rect = descriptor.rect;

        let local_palette = if descriptor.has_local_color_table {
            Some(read_palette(reader, descriptor.local_color_table_len())?)
        } else {
            None
        };
        let palette = local_palette
            .as_ref()
            .or(global_palette)
            .ok_or_else(|| ImageError::MalformedGif("no color table for image block".into()))?;

        let expected = rect.area();
        if expected as u64 > self.config.max_pixels {
            return Err(ImageError::DimensionsExceeded {
                width: rect.width as u32,
                height: rect.height as u32,
                max_pixels: self.config.max_pixels,
            });
        }

        let min_code_size = reader.read_u8()?;
        let compressed = reader.read_sub_blocks()?;
        let mut indices = lzw::decode(min_code_size, &compressed, expected)?;
        if indices.len() < expected {
            return Err(ImageError::MalformedGif(format!(
                "LZW data produced {} of {} pixels",
                indices.len(),
                expected
            )));
        }
        if descriptor.interlaced {
            indices = deinterlace(&indices, rect.width as usize, rect.height as usize);
        }

        let previous = (control.disposal == DisposalMethod::RestorePrevious).then(|| canvas.clone());

        canvas.draw(&rect, &indices, palette, control.transparent_index)?;
        let frame = Frame::new(control.delay_ms, canvas.snapshot());

        match control.disposal {
            DisposalMethod::RestoreBackground => canvas.clear_rect(&rect),
            DisposalMethod::RestorePrevious => {
                if let Some(previous) = previous {
                    *canvas = previous;
                }
            }
            DisposalMethod::None | DisposalMethod::Keep => {}
        }

        trace!(
            ?rect,
            interlaced = descriptor.interlaced,
            local_palette = descriptor.has_local_color_table,
            disposal = ?control.disposal,
            delay_ms = control.delay_ms,
            "GIF image block"
        );

        Ok(frame)
    }
}

/// Read a color table of `entries` RGB triples.
fn read_palette(reader: &mut ByteReader<'_>, entries: usize) -> Result<Palette> {
    let raw = reader.read_bytes(entries * 3)?;
    Palette::from_rgb_triples(raw)
}

/// Reorder interlaced rows into top-to-bottom order.
pub fn deinterlace(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = vec![0u8; width * height];
    let rows = INTERLACE_PASSES
        .iter()
        .flat_map(|&(start, step)| (start..height).step_by(step));

    for (src_row, y) in rows.enumerate() {
        let src = &data[src_row * width..(src_row + 1) * width];
        output[y * width..(y + 1) * width].copy_from_slice(src);
    }

    output
}
