//! Panel layout
//!
//! The sign is a chain of identical modules. Each module has a number of
//! LED columns and a (possibly larger) number of shift-register outputs;
//! the spare outputs sit at the end of every module and must be shifted
//! out as padding so the next module's data lands on its own columns.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometry of a chain of shift-register modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelLayout {
    /// Modules in the chain
    pub modules: u16,
    /// Visible LED columns per module
    pub columns_per_module: u16,
    /// Shift-register outputs per module (>= columns)
    pub outputs_per_module: u16,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            modules: 7,
            columns_per_module: 60,
            outputs_per_module: 64,
        }
    }
}

impl PanelLayout {
    /// Visible panel width in pixels
    pub const fn width(&self) -> u32 {
        self.modules as u32 * self.columns_per_module as u32
    }

    /// Bits shifted out per row, padding included
    pub const fn output_bits(&self) -> u32 {
        self.modules as u32 * self.outputs_per_module as u32
    }

    /// Bytes transmitted per row
    pub const fn row_bytes(&self) -> usize {
        (self.output_bits() as usize + 7) / 8
    }

    /// True when there are no padding outputs
    pub const fn is_contiguous(&self) -> bool {
        self.columns_per_module == self.outputs_per_module
    }

    /// Pack the visible part of a canvas row into shift-register order
    ///
    /// `src` is an MSB-first canvas row; missing source bytes read as
    /// off. Returns the number of bytes written to `dst`, which is
    /// `row_bytes()` clamped to `dst.len()`.
    pub fn pack_row(&self, src: &[u8], dst: &mut [u8]) -> usize {
        let len = self.row_bytes().min(dst.len());
        let dst = &mut dst[..len];

        if self.is_contiguous() {
            let copied = src.len().min(len);
            dst[..copied].copy_from_slice(&src[..copied]);
            dst[copied..].fill(0);
            mask_tail(dst, self.width());
            return len;
        }

        dst.fill(0);
        let cols = self.columns_per_module as usize;
        let outs = self.outputs_per_module as usize;
        for module in 0..self.modules as usize {
            for col in 0..cols {
                if bit(src, module * cols + col) {
                    set_bit(dst, module * outs + col);
                }
            }
        }
        len
    }
}

fn bit(buf: &[u8], index: usize) -> bool {
    buf.get(index / 8)
        .map(|b| b & (0x80 >> (index % 8)) != 0)
        .unwrap_or(false)
}

fn set_bit(buf: &mut [u8], index: usize) {
    if let Some(b) = buf.get_mut(index / 8) {
        *b |= 0x80 >> (index % 8);
    }
}

/// Clear every bit at or past `bits`
fn mask_tail(buf: &mut [u8], bits: u32) {
    let full = bits as usize / 8;
    let rem = bits as usize % 8;
    if full >= buf.len() {
        return;
    }
    if rem != 0 {
        buf[full] &= 0xFF << (8 - rem);
        buf[full + 1..].fill(0);
    } else {
        buf[full..].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let layout = PanelLayout::default();
        assert_eq!(layout.width(), 420);
        assert_eq!(layout.output_bits(), 448);
        assert_eq!(layout.row_bytes(), 56);
        assert!(!layout.is_contiguous());
    }

    #[test]
    fn test_contiguous_pack_is_prefix_copy() {
        let layout = PanelLayout {
            modules: 2,
            columns_per_module: 8,
            outputs_per_module: 8,
        };
        let src = [0xAB, 0xCD, 0xEF, 0x12];
        let mut dst = [0u8; 8];
        assert_eq!(layout.pack_row(&src, &mut dst), 2);
        assert_eq!(&dst[..2], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_contiguous_pack_masks_past_width() {
        let layout = PanelLayout {
            modules: 1,
            columns_per_module: 12,
            outputs_per_module: 12,
        };
        let src = [0xFF, 0xFF, 0xFF];
        let mut dst = [0u8; 2];
        assert_eq!(layout.pack_row(&src, &mut dst), 2);
        assert_eq!(dst, [0xFF, 0xF0]);
    }

    #[test]
    fn test_padded_pack_inserts_gaps() {
        // Two modules of 4 columns on 8 outputs
        let layout = PanelLayout {
            modules: 2,
            columns_per_module: 4,
            outputs_per_module: 8,
        };
        let src = [0b1001_0110];
        let mut dst = [0u8; 2];
        assert_eq!(layout.pack_row(&src, &mut dst), 2);
        assert_eq!(dst, [0b1001_0000, 0b0110_0000]);
    }

    #[test]
    fn test_padded_pack_default_panel() {
        let layout = PanelLayout::default();
        let mut src = [0u8; 53];
        // Last visible column of module 0 and first of module 1
        src[59 / 8] |= 0x80 >> (59 % 8);
        src[60 / 8] |= 0x80 >> (60 % 8);

        let mut dst = [0u8; 64];
        assert_eq!(layout.pack_row(&src, &mut dst), 56);
        let lit: u32 = dst.iter().map(|b| b.count_ones()).sum();
        assert_eq!(lit, 2);
        assert!(bit(&dst, 59));
        assert!(bit(&dst, 64));
    }

    #[test]
    fn test_pack_short_source_reads_off() {
        let layout = PanelLayout::default();
        let mut dst = [0xFFu8; 56];
        layout.pack_row(&[0xFF], &mut dst);
        let lit: u32 = dst.iter().map(|b| b.count_ones()).sum();
        assert_eq!(lit, 8);
    }

    #[test]
    fn test_pack_clamps_to_destination() {
        let layout = PanelLayout::default();
        let mut dst = [0u8; 10];
        assert_eq!(layout.pack_row(&[0xFF; 53], &mut dst), 10);
    }
}
