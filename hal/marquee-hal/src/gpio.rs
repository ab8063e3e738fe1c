//! GPIO output abstractions
//!
//! Provides the output pin trait plus two small compositions the sign
//! needs: a logic line with configurable polarity, and the 3-bit row
//! address bus.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// A named logic line with polarity
///
/// `activate()` drives the electrical level that means "on" for this
/// line, so an active-low `/OE` is written the same way as an active-high
/// one.
pub struct Line<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> Line<P> {
    /// Wrap a pin. The line starts inactive.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut line = Self { pin, active_low };
        line.deactivate();
        line
    }

    /// Drive the line to its active level
    pub fn activate(&mut self) {
        self.pin.set_state(!self.active_low);
    }

    /// Drive the line to its inactive level
    pub fn deactivate(&mut self) {
        self.pin.set_state(self.active_low);
    }

    /// Whether the line is currently at its active level
    pub fn is_active(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }

    /// Access the underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

/// Number of row address lines
pub const ROW_ADDRESS_BITS: usize = 3;

/// Row address bus
///
/// Three outputs driven in parallel, one bit of the row index each
/// (line 0 = bit 0).
pub struct RowAddress<P> {
    lines: [P; ROW_ADDRESS_BITS],
}

impl<P: OutputPin> RowAddress<P> {
    /// Create the bus from its three lines, LSB first. Row 0 is selected.
    pub fn new(lines: [P; ROW_ADDRESS_BITS]) -> Self {
        let mut bus = Self { lines };
        bus.select(0);
        bus
    }

    /// Drive the address lines with the low bits of `row`
    pub fn select(&mut self, row: u8) {
        for (bit, line) in self.lines.iter_mut().enumerate() {
            line.set_state(row & (1 << bit) != 0);
        }
    }

    /// Read back the address currently driven on the lines
    pub fn selected(&self) -> u8 {
        self.lines
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, line)| acc | ((line.is_set_high() as u8) << bit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_line_polarity() {
        let mut oe = Line::new(FakePin::default(), true);
        // Inactive active-low line sits high
        assert!(oe.pin().is_set_high());
        assert!(!oe.is_active());

        oe.activate();
        assert!(!oe.pin().is_set_high());
        assert!(oe.is_active());

        let mut cs = Line::new(FakePin::default(), false);
        assert!(!cs.pin().is_set_high());
        cs.activate();
        assert!(cs.pin().is_set_high());
    }

    #[test]
    fn test_row_address_select() {
        let mut bus = RowAddress::new([FakePin::default(), FakePin::default(), FakePin::default()]);
        assert_eq!(bus.selected(), 0);

        for row in 0..8 {
            bus.select(row);
            assert_eq!(bus.selected(), row);
        }

        // Only the low three bits reach the lines
        bus.select(0b1101);
        assert_eq!(bus.selected(), 0b101);
    }
}
