//! GPIO output for RP2040

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::Peri;

use marquee_hal::{Line, OutputPin};

use crate::pins::{PinBank, PinError};

/// Push-pull output implementing [`OutputPin`]
///
/// An inverted output drives the pin low for a logical high. Row address
/// lines use this; [`Line`]s carry their own polarity instead.
pub struct RpOutput {
    output: Output<'static>,
    inverted: bool,
}

impl RpOutput {
    /// Configure `pin` as an output at `initial` level
    pub fn new(pin: Peri<'static, AnyPin>, initial: bool) -> Self {
        let level = if initial { Level::High } else { Level::Low };
        Self {
            output: Output::new(pin, level),
            inverted: false,
        }
    }

    /// Take `pin` from the bank and wrap it as an inactive [`Line`]
    ///
    /// The output is created already at the inactive level, so the line
    /// never glitches active during setup.
    pub fn line(bank: &mut PinBank, pin: u8, active_low: bool) -> Result<Line<Self>, PinError> {
        let raw = bank.take(pin)?;
        Ok(Line::new(Self::new(raw, active_low), active_low))
    }

    /// Take `pin` from the bank as a plain output, logically low
    pub fn take(bank: &mut PinBank, pin: u8, inverted: bool) -> Result<Self, PinError> {
        let mut output = Self::new(bank.take(pin)?, inverted);
        output.inverted = inverted;
        Ok(output)
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        if self.inverted {
            self.output.set_low();
        } else {
            self.output.set_high();
        }
    }

    fn set_low(&mut self) {
        if self.inverted {
            self.output.set_high();
        } else {
            self.output.set_low();
        }
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high() != self.inverted
    }
}
