//! Row data bus task
//!
//! Owns SPI0 and the latch line, and shifts out whatever row the display
//! task queues on the shared link.

use defmt::*;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};

use marquee_hal::Line;
use marquee_hal_rp2040::{RpOutput, TransferLink};

#[embassy_executor::task]
pub async fn transfer_task(
    link: &'static TransferLink,
    spi: Spi<'static, SPI0, Async>,
    latch: Line<RpOutput>,
) {
    info!("Transfer task started");
    link.run(spi, latch).await
}
