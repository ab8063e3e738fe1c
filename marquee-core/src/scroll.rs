//! Wrap-around scroll engine
//!
//! Each row is treated as a ring of `stride * 8` bits and rotated by one
//! bit in place. The bit that falls off one end re-enters at the other,
//! so the message loops forever without re-rendering.

use crate::canvas::Canvas;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScrollDirection {
    /// Content moves towards column 0
    #[default]
    Left,
    /// Content moves away from column 0
    Right,
}

/// Rotate every row of the canvas by one pixel column
pub fn shift(canvas: &mut Canvas, direction: ScrollDirection) {
    for y in 0..canvas.rows() {
        shift_row(canvas.row_mut(y), direction);
    }
}

/// Rotate one packed MSB-first row by one bit
///
/// Left: bytes are walked last to first, each byte's outgoing MSB becoming
/// the incoming LSB of the byte before it. The MSB of byte 0 wraps into the
/// LSB of the last byte. Right is the mirror image.
pub fn shift_row(row: &mut [u8], direction: ScrollDirection) {
    let (Some(&first), Some(&last)) = (row.first(), row.last()) else {
        return;
    };

    match direction {
        ScrollDirection::Left => {
            let mut carry = first >> 7;
            for byte in row.iter_mut().rev() {
                let out = *byte >> 7;
                *byte = (*byte << 1) | carry;
                carry = out;
            }
        }
        ScrollDirection::Right => {
            let mut carry = last & 0x01;
            for byte in row.iter_mut() {
                let out = *byte & 0x01;
                *byte = (*byte >> 1) | (carry << 7);
                carry = out;
            }
        }
    }
}

/// Length of the bit ring a row rotates through
pub fn ring_len(canvas: &Canvas) -> u32 {
    canvas.stride() as u32 * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn test_shift_left_carries_across_bytes() {
        let mut row = [0b0000_0001, 0b1000_0000];
        shift_row(&mut row, ScrollDirection::Left);
        assert_eq!(row, [0b0000_0011, 0b0000_0000]);
    }

    #[test]
    fn test_shift_left_wraps_msb_to_end() {
        let mut row = [0b1000_0000, 0b0000_0000];
        shift_row(&mut row, ScrollDirection::Left);
        assert_eq!(row, [0b0000_0000, 0b0000_0001]);
    }

    #[test]
    fn test_shift_right_wraps_lsb_to_start() {
        let mut row = [0b0000_0000, 0b0000_0001];
        shift_row(&mut row, ScrollDirection::Right);
        assert_eq!(row, [0b1000_0000, 0b0000_0000]);

        let mut row = [0b0000_0001, 0b0000_0000];
        shift_row(&mut row, ScrollDirection::Right);
        assert_eq!(row, [0b0000_0000, 0b1000_0000]);
    }

    #[test]
    fn test_single_byte_ring() {
        let mut row = [0b1010_0001];
        shift_row(&mut row, ScrollDirection::Left);
        assert_eq!(row, [0b0100_0011]);
        shift_row(&mut row, ScrollDirection::Right);
        assert_eq!(row, [0b1010_0001]);
    }

    #[test]
    fn test_empty_row_is_noop() {
        let mut row: [u8; 0] = [];
        shift_row(&mut row, ScrollDirection::Left);
    }

    #[test]
    fn test_shift_canvas_rows_independent() {
        let mut canvas = Canvas::new(16, 2).unwrap();
        canvas.set_pixel(0, 0, true);
        canvas.set_pixel(15, 1, true);

        shift(&mut canvas, ScrollDirection::Left);

        assert!(canvas.pixel(15, 0));
        assert!(canvas.pixel(14, 1));
        assert_eq!(canvas.row_popcount(0), 1);
        assert_eq!(canvas.row_popcount(1), 1);
    }

    fn canvas_from(width: u32, rows: u32, bits: &[bool]) -> Canvas {
        let mut canvas = Canvas::new(width, rows).unwrap();
        for (i, &on) in bits.iter().enumerate() {
            let x = (i as u32 % width) as i32;
            let y = (i as u32 / width) as i32;
            canvas.set_pixel(x, y, on);
        }
        canvas
    }

    proptest! {
        #[test]
        fn prop_full_ring_left_is_identity(
            bytes in 1u32..40,
            rows in 1u32..8,
            seed in proptest::collection::vec(any::<bool>(), 0..2048),
        ) {
            let width = bytes * 8;
            let original = canvas_from(width, rows, &seed);
            let mut canvas = original.clone();
            for _ in 0..ring_len(&canvas) {
                shift(&mut canvas, ScrollDirection::Left);
            }
            prop_assert_eq!(canvas, original);
        }

        #[test]
        fn prop_right_undoes_left(
            width in 1u32..200,
            seed in proptest::collection::vec(any::<bool>(), 0..1400),
            steps in 0usize..50,
        ) {
            let original = canvas_from(width, 7, &seed);
            let mut canvas = original.clone();
            for _ in 0..steps {
                shift(&mut canvas, ScrollDirection::Left);
            }
            for _ in 0..steps {
                shift(&mut canvas, ScrollDirection::Right);
            }
            prop_assert_eq!(canvas, original);
        }

        #[test]
        fn prop_shift_preserves_row_popcount(
            width in 1u32..300,
            seed in proptest::collection::vec(any::<bool>(), 0..2100),
            steps in 0usize..100,
            left in any::<bool>(),
        ) {
            let mut canvas = canvas_from(width, 7, &seed);
            let before: Vec<u32> = (0..7).map(|y| canvas.row_popcount(y)).collect();
            let direction = if left { ScrollDirection::Left } else { ScrollDirection::Right };
            for _ in 0..steps {
                shift(&mut canvas, direction);
            }
            let after: Vec<u32> = (0..7).map(|y| canvas.row_popcount(y)).collect();
            prop_assert_eq!(before, after);
        }
    }
}
