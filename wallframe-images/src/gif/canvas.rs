//! Logical-screen canvas that image blocks are composited onto.

use crate::error::Result;
use crate::image::Palette;

/// Placement of an image block on the logical screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockRect {
    /// Left edge.
    pub left: u16,
    /// Top edge.
    pub top: u16,
    /// Block width.
    pub width: u16,
    /// Block height.
    pub height: u16,
}

impl BlockRect {
    /// Number of pixels in the block.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// ARGB32 working buffer covering the whole logical screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    background: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            background,
            pixels: vec![background; width * height],
        }
    }

    /// Background color used for fills and restore-to-background.
    pub fn background(&self) -> u32 {
        self.background
    }

    /// Current pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Copy the current pixels out for a frame.
    pub fn snapshot(&self) -> Vec<u32> {
        self.pixels.clone()
    }

    /// Visible rows and columns of `rect`, as offsets inside the block.
    fn clip(&self, rect: &BlockRect) -> (usize, usize) {
        let cols = (rect.width as usize).min(self.width.saturating_sub(rect.left as usize));
        let rows = (rect.height as usize).min(self.height.saturating_sub(rect.top as usize));
        (cols, rows)
    }

    /// Draw a block of palette indices.
    ///
    /// Indices equal to `transparent` leave the canvas untouched and pixels
    /// outside the logical screen are dropped; only the remaining pixels are
    /// resolved through `palette`.
    pub fn draw(
        &mut self,
        rect: &BlockRect,
        indices: &[u8],
        palette: &Palette,
        transparent: Option<u8>,
    ) -> Result<()> {
        let (cols, rows) = self.clip(rect);
        let block_width = rect.width as usize;

        for y in 0..rows {
            let src = &indices[y * block_width..y * block_width + cols];
            let dst_start = (rect.top as usize + y) * self.width + rect.left as usize;
            let dst = &mut self.pixels[dst_start..dst_start + cols];

            for (out, &index) in dst.iter_mut().zip(src) {
                if Some(index) == transparent {
                    continue;
                }
                *out = palette.resolve(index)?;
            }
        }

        Ok(())
    }

    /// Fill the visible part of `rect` with the background color.
    pub fn clear_rect(&mut self, rect: &BlockRect) {
        let (cols, rows) = self.clip(rect);
        for y in 0..rows {
            let start = (rect.top as usize + y) * self.width + rect.left as usize;
            self.pixels[start..start + cols].fill(self.background);
        }
    }
}
