//! RP2040-specific HAL for the Marquee LED sign
//!
//! Implements the `marquee-hal` traits on top of `embassy-rp`, plus the
//! pieces that only make sense on this chip:
//!
//! - GPIO output wrapper
//! - Config-driven pin allocation
//! - SPI + DMA transfer queue with its own driver loop
//! - Hardware alarm periodic timer for the display tick

#![no_std]

pub mod gpio;
pub mod pins;
pub mod timer;
pub mod transfer;

pub use gpio::RpOutput;
pub use pins::{PinBank, PinError};
pub use timer::PeriodicTimer;
pub use transfer::{RowBuffer, SpiTransferQueue, TransferLink};
