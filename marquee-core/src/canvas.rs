//! Packed monochrome canvas
//!
//! One bit per pixel, rows stored back to back, each row padded to a whole
//! number of bytes. Bits are MSB-first: byte 0 of a row holds the leftmost
//! eight pixels, with pixel 0 in bit 7.
//!
//! The canvas never changes size. When the message changes, the driver
//! builds a new one sized to fit the text and drops the old one.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

/// Canvas construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanvasError {
    /// Buffer size overflows `usize`
    TooLarge,
    /// The allocator refused the buffer
    OutOfMemory,
}

/// Packed 1-bit-per-pixel bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    buf: Vec<u8>,
    width: u32,
    rows: u32,
    stride: usize,
}

/// Bytes needed to hold `width` pixels
pub const fn stride_for(width: u32) -> usize {
    (width as usize + 7) / 8
}

impl Canvas {
    /// Allocate a zeroed canvas
    ///
    /// Allocation is fallible: a message too long for the heap yields
    /// [`CanvasError::OutOfMemory`] instead of aborting.
    pub fn new(width: u32, rows: u32) -> Result<Self, CanvasError> {
        let stride = stride_for(width);
        let len = stride
            .checked_mul(rows as usize)
            .ok_or(CanvasError::TooLarge)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| CanvasError::OutOfMemory)?;
        buf.resize(len, 0);

        Ok(Self {
            buf,
            width,
            rows,
            stride,
        })
    }

    /// Canvas dimensions as (width, rows)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.rows)
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Set or clear one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((idx, mask)) = self.locate(x, y) {
            if on {
                self.buf[idx] |= mask;
            } else {
                self.buf[idx] &= !mask;
            }
        }
    }

    /// Read one pixel. Out-of-range coordinates read as off.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .map(|(idx, mask)| self.buf[idx] & mask != 0)
            .unwrap_or(false)
    }

    /// Packed bytes of row `y`
    ///
    /// Returns an empty slice for a row outside the canvas.
    pub fn row(&self, y: u32) -> &[u8] {
        if y >= self.rows {
            return &[];
        }
        let start = y as usize * self.stride;
        &self.buf[start..start + self.stride]
    }

    /// Mutable packed bytes of row `y`
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        if y >= self.rows {
            return &mut [];
        }
        let start = y as usize * self.stride;
        &mut self.buf[start..start + self.stride]
    }

    /// The whole packed buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of lit pixels in row `y`
    pub fn row_popcount(&self, y: u32) -> u32 {
        self.row(y).iter().map(|b| b.count_ones()).sum()
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.rows {
            return None;
        }
        let x = x as usize;
        let idx = y as usize * self.stride + x / 8;
        Some((idx, 0x80 >> (x % 8)))
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.rows)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color.is_on());
        }
        Ok(())
    }
}
