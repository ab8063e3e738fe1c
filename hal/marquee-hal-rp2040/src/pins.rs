//! Config-driven pin allocation
//!
//! GPIO numbers come from `sign.toml`, so the firmware cannot name
//! `p.PIN_7` at compile time. The bank holds every free pin type-erased
//! and hands them out by number.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// GPIOs in bank 0
pub const GPIO_COUNT: usize = 30;

/// Fixed SPI0 clock pin
pub const SPI_SCK: u8 = 18;

/// Fixed SPI0 data pin
pub const SPI_TX: u8 = 19;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin reserved for the SPI bus
    Reserved,
}

/// Holds the GPIOs not claimed by fixed peripherals
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Build a bank from type-erased pins, indexed by GPIO number
    ///
    /// Entries left `None` are reported as reserved.
    pub fn new(pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT]) -> Self {
        Self { pins }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin as usize >= GPIO_COUNT {
            return Err(PinError::InvalidPin);
        }
        if pin == SPI_SCK || pin == SPI_TX {
            return Err(PinError::Reserved);
        }
        self.pins[pin as usize].take().ok_or(PinError::AlreadyTaken)
    }
}

/// Build a [`PinBank`] from `embassy_rp::Peripherals`, leaving out the SPI pins
///
/// Moves every `PIN_n` except `PIN_18` and `PIN_19` out of `$p`, so those
/// two and all non-GPIO peripherals stay usable afterwards.
#[macro_export]
macro_rules! pin_bank {
    ($p:ident) => {{
        use embassy_rp::gpio::AnyPin;
        use embassy_rp::Peri;
        $crate::pins::PinBank::new([
            Some($p.PIN_0.into::<AnyPin>()),
            Some($p.PIN_1.into::<AnyPin>()),
            Some($p.PIN_2.into::<AnyPin>()),
            Some($p.PIN_3.into::<AnyPin>()),
            Some($p.PIN_4.into::<AnyPin>()),
            Some($p.PIN_5.into::<AnyPin>()),
            Some($p.PIN_6.into::<AnyPin>()),
            Some($p.PIN_7.into::<AnyPin>()),
            Some($p.PIN_8.into::<AnyPin>()),
            Some($p.PIN_9.into::<AnyPin>()),
            Some($p.PIN_10.into::<AnyPin>()),
            Some($p.PIN_11.into::<AnyPin>()),
            Some($p.PIN_12.into::<AnyPin>()),
            Some($p.PIN_13.into::<AnyPin>()),
            Some($p.PIN_14.into::<AnyPin>()),
            Some($p.PIN_15.into::<AnyPin>()),
            Some($p.PIN_16.into::<AnyPin>()),
            Some($p.PIN_17.into::<AnyPin>()),
            None,
            None,
            Some($p.PIN_20.into::<AnyPin>()),
            Some($p.PIN_21.into::<AnyPin>()),
            Some($p.PIN_22.into::<AnyPin>()),
            Some($p.PIN_23.into::<AnyPin>()),
            Some($p.PIN_24.into::<AnyPin>()),
            Some($p.PIN_25.into::<AnyPin>()),
            Some($p.PIN_26.into::<AnyPin>()),
            Some($p.PIN_27.into::<AnyPin>()),
            Some($p.PIN_28.into::<AnyPin>()),
            Some($p.PIN_29.into::<AnyPin>()),
        ])
    }};
}
