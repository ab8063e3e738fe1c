//! Text measurement and rendering
//!
//! Glyph lookup and drawing are delegated to a [`GlyphSource`]. This
//! module only lays glyphs out left to right and agrees with the source
//! about which characters exist: anything outside the font's range is
//! zero width and draws nothing.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::canvas::Canvas;

/// A font that can measure and draw single glyphs
pub trait GlyphSource {
    /// Glyph cell height in pixels
    fn height(&self) -> u32;

    /// Horizontal advance of `c`, or `None` if the font does not cover it
    fn advance(&self, c: char) -> Option<u32>;

    /// Draw `c` with its top-left corner at (`x`, `y`)
    fn draw_glyph(&self, canvas: &mut Canvas, c: char, x: i32, y: i32);
}

impl<G: GlyphSource + ?Sized> GlyphSource for &G {
    fn height(&self) -> u32 {
        (**self).height()
    }

    fn advance(&self, c: char) -> Option<u32> {
        (**self).advance(c)
    }

    fn draw_glyph(&self, canvas: &mut Canvas, c: char, x: i32, y: i32) {
        (**self).draw_glyph(canvas, c, x, y)
    }
}

/// Total advance width of `text` in pixels
pub fn measure<G: GlyphSource + ?Sized>(font: &G, text: &str) -> u32 {
    text.chars()
        .filter_map(|c| font.advance(c))
        .fold(0u32, |w, a| w.saturating_add(a))
}

/// Top row for glyphs so their bottom edge sits on the last canvas row
pub fn baseline<G: GlyphSource + ?Sized>(font: &G, rows: u32) -> i32 {
    rows.saturating_sub(font.height()) as i32
}

/// Draw `text` into `canvas` starting at column 0
///
/// The caller sizes the canvas to at least [`measure`]; glyphs past the
/// right edge are clipped.
pub fn render<G: GlyphSource + ?Sized>(canvas: &mut Canvas, font: &G, text: &str) {
    let y = baseline(font, canvas.rows());
    let mut x: i64 = 0;

    for c in text.chars() {
        let Some(advance) = font.advance(c) else {
            continue;
        };
        if x >= canvas.width() as i64 {
            break;
        }
        font.draw_glyph(canvas, c, x as i32, y);
        x += advance as i64;
    }
}

/// [`GlyphSource`] over an `embedded-graphics` monospace font
#[derive(Clone, Copy)]
pub struct MonoGlyphs<'a> {
    font: &'a MonoFont<'a>,
    first: char,
    last: char,
}

impl<'a> MonoGlyphs<'a> {
    /// Wrap a font covering the printable ASCII range
    pub const fn ascii(font: &'a MonoFont<'a>) -> Self {
        Self::with_range(font, ' ', '~')
    }

    /// Wrap a font covering `first..=last`
    pub const fn with_range(font: &'a MonoFont<'a>, first: char, last: char) -> Self {
        Self { font, first, last }
    }

    fn covers(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }
}

impl GlyphSource for MonoGlyphs<'_> {
    fn height(&self) -> u32 {
        self.font.character_size.height
    }

    fn advance(&self, c: char) -> Option<u32> {
        self.covers(c)
            .then(|| self.font.character_size.width + self.font.character_spacing)
    }

    fn draw_glyph(&self, canvas: &mut Canvas, c: char, x: i32, y: i32) {
        if !self.covers(c) {
            return;
        }
        let mut utf8 = [0u8; 4];
        let glyph = c.encode_utf8(&mut utf8);
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        Text::with_baseline(glyph, Point::new(x, y), style, Baseline::Top)
            .draw(canvas)
            .ok();
    }
}
